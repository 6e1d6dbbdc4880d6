// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the value types every other part of the tool
//! passes around: integer pixel points, axis-aligned rectangles, frame
//! references and the finalized annotation entries built from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 2D point in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i64; 2]", into = "[i64; 2]")]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    /// Marker for a coordinate that has not been set yet.
    pub const UNSET: Point = Point { x: -1, y: -1 };

    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Componentwise minimum.
    pub fn min(self, other: Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// Componentwise maximum.
    pub fn max(self, other: Point) -> Point {
        Point::new(self.x.max(other.x), self.y.max(other.y))
    }

    /// Mirror this point through `center` (`2 * center - self`).
    pub fn reflect_through(self, center: Point) -> Point {
        Point::new(2 * center.x - self.x, 2 * center.y - self.y)
    }
}

impl From<[i64; 2]> for Point {
    fn from([x, y]: [i64; 2]) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for [i64; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// An axis-aligned rectangle given by two corners.
///
/// A rectangle is only meaningful once `start` lies strictly above and to
/// the left of `end`; see [`Rect::is_valid`]. Working rectangles may be
/// invalid while a gesture is in progress, committed ones never are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub start: Point,
    pub end: Point,
}

impl Rect {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    /// The unset rectangle, both corners at [`Point::UNSET`].
    pub const fn unset() -> Self {
        Self::new(Point::UNSET, Point::UNSET)
    }

    /// Smallest rectangle with `a` and `b` as opposite corners.
    pub fn spanning(a: Point, b: Point) -> Self {
        Self::new(a.min(b), a.max(b))
    }

    /// Whether `start < end` holds strictly on both axes.
    pub fn is_valid(&self) -> bool {
        self.start.x < self.end.x && self.start.y < self.end.y
    }

    pub fn width(&self) -> i64 {
        self.end.x - self.start.x
    }

    pub fn height(&self) -> i64 {
        self.end.y - self.start.y
    }

    /// Integer centre (rounded towards negative infinity).
    pub fn center(&self) -> Point {
        Point::new(
            (self.start.x + self.end.x).div_euclid(2),
            (self.start.y + self.end.y).div_euclid(2),
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Opaque label a frame source gives to a frame (a file stem, or a
/// synthetic `timestamp_<n>` for multi-page files).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameRef(pub String);

impl FrameRef {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finalized rectangle together with the frame it was drawn on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationEntry {
    pub rect: Rect,
    /// Always set for live annotations; older tracking files may omit it.
    pub frame_ref: Option<FrameRef>,
}

impl AnnotationEntry {
    pub fn new(rect: Rect, frame_ref: FrameRef) -> Self {
        Self {
            rect,
            frame_ref: Some(frame_ref),
        }
    }
}
