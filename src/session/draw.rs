// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Rectangle drawing and reshaping driven by pointer gestures.
//!
//! A press either anchors a new rectangle or, with the modifier held on an
//! existing valid rectangle, grabs its nearest corner. Moves update the
//! working rectangle and the release finalizes it. Nothing here knows about
//! frames or history; the session decides what a finished rectangle means.

use crate::models::annotation::{Point, Rect};

/// Which point of a new rectangle the press position stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorMode {
    /// The press marks the centre; the rectangle grows symmetrically.
    #[default]
    FromCenter,
    /// The press marks one corner; the release marks the opposite one.
    FromCorner,
}

/// Rectangle corners, numbered top-left, top-right, bottom-left, bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft = 0,
    TopRight = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Corner {
    /// Corner of `rect` in the quadrant containing `point`.
    pub fn nearest(rect: &Rect, point: Point) -> Corner {
        let left = point.x - rect.start.x < rect.end.x - point.x;
        let top = point.y - rect.start.y < rect.end.y - point.y;
        match (left, top) {
            (true, true) => Corner::TopLeft,
            (false, true) => Corner::TopRight,
            (true, false) => Corner::BottomLeft,
            (false, false) => Corner::BottomRight,
        }
    }

    /// Move this corner of `rect` to `point`.
    ///
    /// Each corner owns exactly one x and one y coordinate; the other two are
    /// left untouched.
    pub fn move_to(self, rect: Rect, point: Point) -> Rect {
        let Rect { start, end } = rect;
        match self {
            Corner::TopLeft => Rect::new(point, end),
            Corner::TopRight => Rect::new(Point::new(start.x, point.y), Point::new(point.x, end.y)),
            Corner::BottomLeft => Rect::new(Point::new(point.x, start.y), Point::new(end.x, point.y)),
            Corner::BottomRight => Rect::new(start, point),
        }
    }
}

/// What the current gesture is manipulating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveGesture {
    #[default]
    Idle,
    WholeRect,
    Corner(Corner),
}

/// Owns the working rectangle and interprets pointer gestures on it.
#[derive(Debug, Clone, Default)]
pub struct DrawController {
    anchor_mode: AnchorMode,
    active: ActiveGesture,
    /// Whether a rectangle is showing (set by the first move of a drag).
    committed: bool,
    rect: WorkingRect,
}

/// Working corners, which may be unset or unordered mid-gesture.
#[derive(Debug, Clone, Copy)]
struct WorkingRect(Rect);

impl Default for WorkingRect {
    fn default() -> Self {
        Self(Rect::unset())
    }
}

impl DrawController {
    pub fn new(anchor_mode: AnchorMode) -> Self {
        Self {
            anchor_mode,
            ..Self::default()
        }
    }

    pub fn anchor_mode(&self) -> AnchorMode {
        self.anchor_mode
    }

    /// Switch anchor mode. Takes effect for the next release.
    pub fn set_anchor_mode(&mut self, mode: AnchorMode) {
        self.anchor_mode = mode;
    }

    pub fn active(&self) -> ActiveGesture {
        self.active
    }

    /// Clear the working rectangle and any gesture, keeping the anchor mode.
    pub fn reset(&mut self) {
        *self = Self::new(self.anchor_mode);
    }

    /// Dispatch a pointer press: corner edit when `modifier` is held over a
    /// valid rectangle, a fresh rectangle otherwise.
    pub fn press(&mut self, point: Point, modifier: bool) {
        if modifier && self.begin_corner_edit(point).is_some() {
            return;
        }
        self.begin_drag(point);
    }

    /// Start a new rectangle anchored at `point`, discarding the old one.
    pub fn begin_drag(&mut self, point: Point) {
        self.reset();
        self.rect.0.start = point;
        self.active = ActiveGesture::WholeRect;
    }

    /// Grab the corner nearest to `point` and move it there.
    ///
    /// Returns `None` and leaves the state alone when there is no valid
    /// rectangle to reshape.
    pub fn begin_corner_edit(&mut self, point: Point) -> Option<Corner> {
        if !self.rect.0.is_valid() {
            return None;
        }
        let corner = Corner::nearest(&self.rect.0, point);
        self.active = ActiveGesture::Corner(corner);
        self.rect.0 = corner.move_to(self.rect.0, point);
        log::debug!("Editing corner {:?} of {}", corner, self.rect.0);
        Some(corner)
    }

    /// Pointer moved with the drawing button held.
    pub fn drag_to(&mut self, point: Point) {
        match self.active {
            ActiveGesture::Idle => {}
            ActiveGesture::WholeRect => {
                self.rect.0.end = point;
                self.committed = true;
            }
            ActiveGesture::Corner(corner) => {
                self.rect.0 = corner.move_to(self.rect.0, point);
            }
        }
    }

    /// Pointer released: finalize and normalize the working rectangle.
    pub fn end_drag(&mut self, point: Point) {
        let (fixed, free) = match self.active {
            ActiveGesture::Idle => return,
            ActiveGesture::WholeRect => {
                let anchor = self.rect.0.start;
                let fixed = match self.anchor_mode {
                    AnchorMode::FromCorner => anchor,
                    AnchorMode::FromCenter => point.reflect_through(anchor),
                };
                (fixed, point)
            }
            // Only differs from the current corners if the grabbed corner
            // was dragged across the opposite edge.
            ActiveGesture::Corner(_) => (self.rect.0.start, self.rect.0.end),
        };
        self.rect.0 = Rect::spanning(fixed, free);
        self.active = ActiveGesture::Idle;
    }

    /// The finished rectangle, if one is showing and it has positive extent.
    pub fn current_rectangle(&self) -> Option<Rect> {
        (self.committed && self.rect.0.is_valid()).then_some(self.rect.0)
    }

    /// The rectangle to draw right now, normalized, mid-gesture included.
    pub fn preview_rectangle(&self) -> Option<Rect> {
        if !self.committed {
            return None;
        }
        let Rect { start, end } = self.rect.0;
        let preview = match (self.active, self.anchor_mode) {
            (ActiveGesture::WholeRect, AnchorMode::FromCenter) => {
                Rect::spanning(end.reflect_through(start), end)
            }
            _ => Rect::spanning(start, end),
        };
        Some(preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drawn(mode: AnchorMode, anchor: Point, moves: &[Point], release: Point) -> DrawController {
        let mut draw = DrawController::new(mode);
        draw.press(anchor, false);
        for point in moves {
            draw.drag_to(*point);
        }
        draw.end_drag(release);
        draw
    }

    #[test]
    fn test_from_center_keeps_anchor_as_center() {
        let releases = [
            Point::new(30, 45),
            Point::new(3, 8),
            Point::new(31, 2),
            Point::new(0, 50),
        ];
        let anchor = Point::new(17, 21);
        for release in releases {
            let draw = drawn(AnchorMode::FromCenter, anchor, &[release], release);
            let rect = draw.current_rectangle().unwrap();
            let center = rect.center();
            assert!((center.x - anchor.x).abs() <= 1, "{rect} for {release}");
            assert!((center.y - anchor.y).abs() <= 1, "{rect} for {release}");
        }
    }

    #[test]
    fn test_from_corner_spans_anchor_to_release() {
        let anchor = Point::new(5, 6);
        let release = Point::new(20, 30);
        let draw = drawn(AnchorMode::FromCorner, anchor, &[Point::new(9, 9), release], release);
        assert_eq!(draw.current_rectangle(), Some(Rect::new(anchor, release)));

        // Dragging up-left normalizes so the release becomes the start.
        let draw = drawn(AnchorMode::FromCorner, release, &[anchor], anchor);
        assert_eq!(draw.current_rectangle(), Some(Rect::new(anchor, release)));
    }

    #[test]
    fn test_click_without_move_draws_nothing() {
        let mut draw = DrawController::new(AnchorMode::FromCorner);
        draw.press(Point::new(4, 4), false);
        draw.end_drag(Point::new(12, 12));
        assert_eq!(draw.current_rectangle(), None);
        assert_eq!(draw.preview_rectangle(), None);
    }

    #[test]
    fn test_degenerate_drag_is_not_a_rectangle() {
        let draw = drawn(
            AnchorMode::FromCorner,
            Point::new(10, 10),
            &[Point::new(10, 25)],
            Point::new(10, 25),
        );
        assert_eq!(draw.current_rectangle(), None);
    }

    #[test]
    fn test_nearest_corner_by_quadrant() {
        let rect = Rect::new(Point::new(0, 0), Point::new(100, 50));
        assert_eq!(Corner::nearest(&rect, Point::new(10, 10)), Corner::TopLeft);
        assert_eq!(Corner::nearest(&rect, Point::new(90, 10)), Corner::TopRight);
        assert_eq!(Corner::nearest(&rect, Point::new(10, 40)), Corner::BottomLeft);
        assert_eq!(Corner::nearest(&rect, Point::new(90, 40)), Corner::BottomRight);
        // Outside the rectangle still resolves by side.
        assert_eq!(Corner::nearest(&rect, Point::new(-20, 80)), Corner::BottomLeft);
    }

    #[test]
    fn test_corner_move_touches_only_owned_coordinates() {
        let rect = Rect::new(Point::new(10, 20), Point::new(30, 40));
        let to = Point::new(12, 22);

        let moved = Corner::TopLeft.move_to(rect, to);
        assert_eq!(moved.end, rect.end);
        assert_eq!(moved.start, to);

        let moved = Corner::TopRight.move_to(rect, to);
        assert_eq!((moved.start.x, moved.end.y), (rect.start.x, rect.end.y));
        assert_eq!((moved.end.x, moved.start.y), (to.x, to.y));

        let moved = Corner::BottomLeft.move_to(rect, to);
        assert_eq!((moved.start.y, moved.end.x), (rect.start.y, rect.end.x));
        assert_eq!((moved.start.x, moved.end.y), (to.x, to.y));

        let moved = Corner::BottomRight.move_to(rect, to);
        assert_eq!(moved.start, rect.start);
        assert_eq!(moved.end, to);
    }

    #[test]
    fn test_corner_edit_reshapes_existing_rect() {
        let mut draw = drawn(
            AnchorMode::FromCorner,
            Point::new(10, 10),
            &[Point::new(50, 50)],
            Point::new(50, 50),
        );
        draw.press(Point::new(45, 12), true);
        assert_eq!(draw.active(), ActiveGesture::Corner(Corner::TopRight));
        draw.drag_to(Point::new(60, 5));
        draw.end_drag(Point::new(60, 5));
        assert_eq!(
            draw.current_rectangle(),
            Some(Rect::new(Point::new(10, 5), Point::new(60, 50)))
        );
    }

    #[test]
    fn test_corner_dragged_past_opposite_edge_is_renormalized() {
        let mut draw = drawn(
            AnchorMode::FromCorner,
            Point::new(10, 10),
            &[Point::new(20, 20)],
            Point::new(20, 20),
        );
        draw.press(Point::new(11, 11), true);
        draw.drag_to(Point::new(30, 25));
        draw.end_drag(Point::new(30, 25));
        assert_eq!(
            draw.current_rectangle(),
            Some(Rect::new(Point::new(20, 20), Point::new(30, 25)))
        );
    }

    #[test]
    fn test_modifier_without_rect_starts_new_drag() {
        let mut draw = DrawController::default();
        draw.press(Point::new(3, 3), true);
        assert_eq!(draw.active(), ActiveGesture::WholeRect);
    }

    #[test]
    fn test_preview_mirrors_during_center_drag() {
        let mut draw = DrawController::new(AnchorMode::FromCenter);
        draw.press(Point::new(10, 10), false);
        draw.drag_to(Point::new(14, 16));
        assert_eq!(
            draw.preview_rectangle(),
            Some(Rect::new(Point::new(6, 4), Point::new(14, 16)))
        );

        draw.end_drag(Point::new(14, 16));
        assert_eq!(draw.current_rectangle(), draw.preview_rectangle());
    }

    #[test]
    fn test_reset_keeps_anchor_mode() {
        let mut draw = drawn(
            AnchorMode::FromCorner,
            Point::new(1, 1),
            &[Point::new(9, 9)],
            Point::new(9, 9),
        );
        draw.reset();
        assert_eq!(draw.anchor_mode(), AnchorMode::FromCorner);
        assert_eq!(draw.current_rectangle(), None);
        assert_eq!(draw.active(), ActiveGesture::Idle);
    }
}
