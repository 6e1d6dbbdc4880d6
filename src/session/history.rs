// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Two-level annotation history.
//!
//! Holds the completed units, the unit being edited and the frame cursor
//! together, so that every mutation keeps the cursor consistent with the
//! entries of the current unit. Undo first peels entries off the current
//! unit, then reopens completed units one at a time.

use crate::models::annotation::{AnnotationEntry, FrameRef};
use crate::models::unit::Unit;

/// What a call to [`History::undo`] took back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoStep {
    /// Removed the latest entry of the current unit.
    Entry,
    /// Moved the last completed unit back into editing.
    Reopened,
    /// The last completed unit belongs to a frame the source does not
    /// have, so it stays completed.
    Unplaced,
    /// History was empty.
    Nothing,
}

/// Completed units plus the unit in progress and its frame cursor.
#[derive(Debug, Clone)]
pub struct History<U: Unit> {
    completed: Vec<U>,
    current: U,
    cursor: usize,
    starting_frame: usize,
}

impl<U: Unit> History<U> {
    pub fn new(starting_frame: usize) -> Self {
        Self {
            completed: Vec::new(),
            current: U::default(),
            cursor: starting_frame,
            starting_frame,
        }
    }

    /// Frame currently being annotated.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn starting_frame(&self) -> usize {
        self.starting_frame
    }

    pub fn current(&self) -> &U {
        &self.current
    }

    pub fn completed(&self) -> &[U] {
        &self.completed
    }

    /// Add an entry drawn on the cursor frame to the current unit.
    pub fn record_entry(&mut self, entry: AnnotationEntry) {
        self.current.record(self.cursor, entry);
        self.cursor = U::cursor_after_record(self.cursor);
    }

    /// Close the current unit on the cursor frame and start an empty one.
    ///
    /// Returns the number of completed units.
    pub fn commit_unit(&mut self, frame_ref: &FrameRef) -> usize {
        let mut unit = std::mem::take(&mut self.current);
        unit.seal(self.cursor, frame_ref);
        log::info!(
            "Completed {} {} with {} entries at frame {}",
            U::NAME,
            self.completed.len(),
            unit.len(),
            self.cursor
        );
        self.completed.push(unit);
        self.cursor = U::cursor_after_commit(self.cursor, self.starting_frame);
        self.completed.len()
    }

    /// Take back the most recent entry, or reopen the last completed unit
    /// when the current one is empty.
    pub fn undo(&mut self) -> UndoStep {
        if let Some(cursor) = self.current.remove_latest(self.cursor) {
            self.cursor = cursor;
            log::info!("Undo: removed entry, cursor at frame {}", self.cursor);
            return UndoStep::Entry;
        }

        let Some(last) = self.completed.last() else {
            log::debug!("Undo: history is empty");
            return UndoStep::Nothing;
        };
        let Some(cursor) = last.reopen_cursor(self.starting_frame) else {
            log::warn!(
                "Undo: cannot reopen {} {}, its frame is not in this source",
                U::NAME,
                self.completed.len() - 1
            );
            return UndoStep::Unplaced;
        };
        let Some(mut unit) = self.completed.pop() else {
            return UndoStep::Nothing;
        };
        self.cursor = cursor;
        unit.unseal();
        self.current = unit;
        log::info!(
            "Undo: reopened {} {}, cursor at frame {}",
            U::NAME,
            self.completed.len(),
            self.cursor
        );
        UndoStep::Reopened
    }

    /// Swap in a previously saved collection of completed units. Their frame
    /// references are resolved with `find` so undo can reopen them in place.
    pub fn replace_completed(
        &mut self,
        mut units: Vec<U>,
        find: &dyn Fn(&FrameRef) -> Option<usize>,
    ) -> Vec<U> {
        for unit in &mut units {
            unit.locate(find);
        }
        std::mem::replace(&mut self.completed, units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::annotation::{Point, Rect};
    use crate::models::unit::{FrameObjects, ObjectTrack};

    fn entry(x: i64, label: &str) -> AnnotationEntry {
        AnnotationEntry::new(
            Rect::new(Point::new(x, x), Point::new(x + 4, x + 4)),
            FrameRef::new(label),
        )
    }

    #[test]
    fn test_undo_on_empty_history_is_noop() {
        let mut history = History::<ObjectTrack>::new(3);
        assert_eq!(history.undo(), UndoStep::Nothing);
        assert_eq!(history.cursor(), 3);
        assert!(history.current().is_empty());
    }

    #[test]
    fn test_tracking_commit_then_undo_roundtrip() {
        let mut history = History::<ObjectTrack>::new(0);
        for frame in 0..3 {
            history.record_entry(entry(frame, "t"));
        }
        let before = history.current().clone();
        let cursor = history.cursor();
        assert_eq!(cursor, 3);

        assert_eq!(history.commit_unit(&FrameRef::new("t3")), 1);
        assert_eq!(history.cursor(), 0);
        assert!(history.current().is_empty());

        assert_eq!(history.undo(), UndoStep::Reopened);
        assert_eq!(history.current(), &before);
        assert_eq!(history.cursor(), cursor);
        assert!(history.completed().is_empty());
    }

    #[test]
    fn test_detection_commit_then_undo_roundtrip() {
        let mut history = History::<FrameObjects>::new(0);
        history.commit_unit(&FrameRef::new("f0"));
        history.record_entry(entry(1, "f1"));
        history.record_entry(entry(2, "f1"));
        let before = history.current().clone();
        assert_eq!(history.cursor(), 1);

        history.commit_unit(&FrameRef::new("f1"));
        assert_eq!(history.cursor(), 2);

        assert_eq!(history.undo(), UndoStep::Reopened);
        assert_eq!(history.current(), &before);
        assert_eq!(history.cursor(), 1);
    }

    #[test]
    fn test_undo_walks_back_through_both_levels() {
        let mut history = History::<ObjectTrack>::new(2);
        history.record_entry(entry(2, "a"));
        history.record_entry(entry(3, "a"));
        history.commit_unit(&FrameRef::new("a"));
        history.record_entry(entry(2, "b"));
        assert_eq!(history.cursor(), 3);

        assert_eq!(history.undo(), UndoStep::Entry);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.undo(), UndoStep::Reopened);
        assert_eq!(history.cursor(), 4);
        assert_eq!(history.undo(), UndoStep::Entry);
        assert_eq!(history.cursor(), 3);
        assert_eq!(history.undo(), UndoStep::Entry);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.undo(), UndoStep::Nothing);
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn test_loaded_units_reopen_on_their_own_frame() {
        let find = |reference: &FrameRef| -> Option<usize> {
            reference.as_str().strip_prefix('f')?.parse().ok()
        };
        let mut history = History::<FrameObjects>::new(0);
        history.replace_completed(
            vec![
                FrameObjects::new(FrameRef::new("x"), vec![entry(1, "x")]),
                FrameObjects::new(FrameRef::new("f3"), vec![entry(2, "f3")]),
            ],
            &find,
        );

        assert_eq!(history.undo(), UndoStep::Reopened);
        assert_eq!(history.cursor(), 3);
        assert_eq!(history.undo(), UndoStep::Entry);
        assert_eq!(history.cursor(), 3);

        // "x" is not a frame of this source, so it cannot be edited here.
        assert_eq!(history.undo(), UndoStep::Unplaced);
        assert_eq!(history.completed().len(), 1);
        assert_eq!(history.completed()[0].frame_ref, FrameRef::new("x"));
        assert_eq!(history.cursor(), 3);
    }
}
