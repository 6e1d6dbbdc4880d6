// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Units of annotation work.
//!
//! A unit is whatever one commit-without-rectangle closes: every object on
//! one frame in detection mode, or one object's trajectory over many frames
//! in tracking mode. The [`Unit`] trait carries the handful of places where
//! the two modes move the frame cursor differently, so the history stack
//! can implement undo once for both.

use super::annotation::{AnnotationEntry, FrameRef, Rect};
use std::collections::BTreeMap;
use std::fmt;

/// How many past positions of the current track are drawn behind the cursor.
const PAST_POSITIONS_SHOWN: usize = 4;

/// Behaviour shared by the per-mode unit types.
pub trait Unit: Default + Clone + fmt::Debug + PartialEq {
    /// Noun used in log messages for one unit.
    const NAME: &'static str;

    /// Whether the display may preview neighbouring frames without moving
    /// the cursor.
    const PREVIEWS_NEIGHBOURS: bool;

    /// Whether running past the last frame only closes this unit instead of
    /// ending the session.
    const CLOSES_AT_SOURCE_END: bool;

    /// Add `entry`, drawn on frame `frame`.
    fn record(&mut self, frame: usize, entry: AnnotationEntry);

    /// Remove the most recent entry and return where the cursor belongs
    /// afterwards, or `None` if the unit is empty.
    fn remove_latest(&mut self, cursor: usize) -> Option<usize>;

    /// Cursor position after recording on `frame`.
    fn cursor_after_record(frame: usize) -> usize;

    /// Cursor position after closing the unit that was being edited at `frame`.
    fn cursor_after_commit(frame: usize, starting_frame: usize) -> usize;

    /// Cursor position when this completed unit is reopened by undo, or
    /// `None` if the unit's frame is not known to the frame source.
    fn reopen_cursor(&self, starting_frame: usize) -> Option<usize>;

    /// Resolve frame indices of a unit read from disk through `find`, which
    /// maps a frame reference to its index in the current source.
    fn locate(&mut self, _find: &dyn Fn(&FrameRef) -> Option<usize>) {}

    /// Attach the frame the unit was closed on.
    fn seal(&mut self, frame: usize, reference: &FrameRef);

    /// Drop whatever [`Unit::seal`] attached.
    fn unseal(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Objects other than the one being drawn that appear on `frame`.
    fn other_objects(completed: &[Self], current: &Self, frame: usize) -> Vec<Rect>;

    /// Earlier positions of the object being drawn, as seen from `frame`.
    fn past_positions(&self, frame: usize) -> Vec<Rect>;
}

/// Detection mode: all objects annotated on a single frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameObjects {
    /// Frame index the list was closed on. For lists read from disk this is
    /// looked up from `frame_ref`, and stays `None` if the source lacks it.
    pub frame_index: Option<usize>,
    /// Frame the list was closed on; empty while the list is in progress.
    pub frame_ref: FrameRef,
    pub objects: Vec<AnnotationEntry>,
}

impl FrameObjects {
    pub fn new(frame_ref: FrameRef, objects: Vec<AnnotationEntry>) -> Self {
        Self {
            frame_index: None,
            frame_ref,
            objects,
        }
    }
}

impl Unit for FrameObjects {
    const NAME: &'static str = "frame";
    const PREVIEWS_NEIGHBOURS: bool = false;
    const CLOSES_AT_SOURCE_END: bool = false;

    fn record(&mut self, _frame: usize, entry: AnnotationEntry) {
        self.objects.push(entry);
    }

    fn remove_latest(&mut self, cursor: usize) -> Option<usize> {
        self.objects.pop().map(|_| cursor)
    }

    fn cursor_after_record(frame: usize) -> usize {
        frame
    }

    fn cursor_after_commit(frame: usize, _starting_frame: usize) -> usize {
        frame + 1
    }

    fn reopen_cursor(&self, _starting_frame: usize) -> Option<usize> {
        // Editing the list anywhere but on its own frame would re-seal it
        // under another reference.
        self.frame_index
    }

    fn locate(&mut self, find: &dyn Fn(&FrameRef) -> Option<usize>) {
        self.frame_index = find(&self.frame_ref);
    }

    fn seal(&mut self, frame: usize, reference: &FrameRef) {
        self.frame_index = Some(frame);
        self.frame_ref = reference.clone();
    }

    fn unseal(&mut self) {
        self.frame_index = None;
        self.frame_ref = FrameRef::default();
    }

    fn len(&self) -> usize {
        self.objects.len()
    }

    fn other_objects(_completed: &[Self], current: &Self, _frame: usize) -> Vec<Rect> {
        // Completed lists belong to frames already left behind.
        current.objects.iter().map(|entry| entry.rect).collect()
    }

    fn past_positions(&self, _frame: usize) -> Vec<Rect> {
        Vec::new()
    }
}

/// Tracking mode: one object's position on each frame it was annotated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectTrack {
    pub positions: BTreeMap<usize, AnnotationEntry>,
}

impl ObjectTrack {
    pub fn new(positions: BTreeMap<usize, AnnotationEntry>) -> Self {
        Self { positions }
    }

    pub fn position(&self, frame: usize) -> Option<&AnnotationEntry> {
        self.positions.get(&frame)
    }
}

impl Unit for ObjectTrack {
    const NAME: &'static str = "object";
    const PREVIEWS_NEIGHBOURS: bool = true;
    const CLOSES_AT_SOURCE_END: bool = true;

    fn record(&mut self, frame: usize, entry: AnnotationEntry) {
        self.positions.insert(frame, entry);
    }

    fn remove_latest(&mut self, _cursor: usize) -> Option<usize> {
        // Positions are recorded on consecutive frames ending at cursor - 1,
        // so the latest entry is the highest frame index.
        self.positions.pop_last().map(|(frame, _)| frame)
    }

    fn cursor_after_record(frame: usize) -> usize {
        frame + 1
    }

    fn cursor_after_commit(_frame: usize, starting_frame: usize) -> usize {
        starting_frame
    }

    fn reopen_cursor(&self, starting_frame: usize) -> Option<usize> {
        let cursor = self
            .positions
            .last_key_value()
            .map(|(frame, _)| frame + 1)
            .unwrap_or(starting_frame);
        Some(cursor)
    }

    fn seal(&mut self, _frame: usize, _reference: &FrameRef) {}

    fn unseal(&mut self) {}

    fn len(&self) -> usize {
        self.positions.len()
    }

    fn other_objects(completed: &[Self], _current: &Self, frame: usize) -> Vec<Rect> {
        completed
            .iter()
            .filter_map(|track| track.position(frame))
            .map(|entry| entry.rect)
            .collect()
    }

    fn past_positions(&self, frame: usize) -> Vec<Rect> {
        (1..=PAST_POSITIONS_SHOWN)
            .filter_map(|back| frame.checked_sub(back))
            .filter_map(|past| self.position(past))
            .map(|entry| entry.rect)
            .collect()
    }
}
