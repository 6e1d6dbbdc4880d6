// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation session state machine.
//!
//! A [`Session`] owns everything that changes while annotating: the
//! rectangle being drawn, the history of finished entries and units, the
//! frame cursor and the frame source. The UI turns pointer and keyboard
//! input into [`Command`]s and hands them to [`Session::handle`]; every
//! transition runs to completion before the next command is looked at.

pub mod draw;
pub mod history;

use crate::config::SessionConfig;
use crate::io::media::{Frame, FrameSource};
use crate::io::serialization::{load_units, save_path, save_units, Codec};
use crate::models::annotation::{AnnotationEntry, FrameRef, Point, Rect};
use crate::models::unit::Unit;
use anyhow::{Context, Result};
use draw::{AnchorMode, DrawController};
use history::{History, UndoStep};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Furthest the display may wander from the cursor, in frames.
pub const PREVIEW_WINDOW: i64 = 20;

const AUTOSAVE_SUFFIX: &str = "autosave";
const FINAL_SUFFIX: &str = "onquit";

/// Everything the UI can ask a session to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Drawing button pressed; `modifier` asks to reshape the nearest corner.
    PointerPressed { point: Point, modifier: bool },
    PointerDragged(Point),
    PointerReleased(Point),
    /// Validate the drawn rectangle, or close the unit if there is none.
    Commit,
    /// Close the current unit whether or not a rectangle is drawn.
    NextUnit,
    Undo,
    Save { include_in_progress: bool },
    Load(PathBuf),
    Quit,
    SetAnchorMode(AnchorMode),
    SetDisplayOffset(i64),
    ResetDisplayOffset,
    SetAutosaveInterval(usize),
    SetChannelsPerTimestamp(usize),
}

/// Why a session stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user asked to quit.
    Quit,
    /// The cursor ran past the last frame.
    Exhausted,
}

/// Result of handling one command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Continue,
    Finished {
        reason: SessionEnd,
        /// Final save file, if it could be written.
        saved: Option<PathBuf>,
    },
}

/// Rectangles to draw over the displayed frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlays {
    /// Other objects on the displayed frame.
    pub others: Vec<Rect>,
    /// Earlier positions of the object being tracked.
    pub past: Vec<Rect>,
    /// The rectangle being drawn.
    pub drawing: Option<Rect>,
}

/// Whether completing unit number `count` triggers an autosave.
pub fn autosave_due(count: usize, interval: usize) -> bool {
    interval != 0 && count % interval == 0
}

pub struct Session<U: Codec> {
    config: SessionConfig,
    draw: DrawController,
    history: History<U>,
    source: Box<dyn FrameSource>,
    display_offset: i64,
    /// Reference of the cursor frame, which entries are recorded against.
    cursor_ref: FrameRef,
    frame: Option<Frame>,
    frame_generation: u64,
    last_error: Option<String>,
    ended: Option<SessionEnd>,
}

impl<U: Codec> Session<U> {
    /// Start a session on the configured starting frame.
    pub fn new(config: SessionConfig, source: Box<dyn FrameSource>) -> Result<Self> {
        let mut session = Self {
            draw: DrawController::new(config.anchor_mode),
            history: History::new(config.starting_frame),
            source,
            display_offset: 0,
            cursor_ref: FrameRef::default(),
            frame: None,
            frame_generation: 0,
            last_error: None,
            ended: None,
            config,
        };
        session.show_frame().with_context(|| {
            format!(
                "Cannot start at frame {} of a source with {} frames",
                session.config.starting_frame,
                session.source.frame_count()
            )
        })?;
        log::info!(
            "Started {} annotation at frame {} of {}",
            U::NAME,
            session.history.cursor(),
            session.source.frame_count()
        );
        Ok(session)
    }

    pub fn cursor(&self) -> usize {
        self.history.cursor()
    }

    pub fn display_offset(&self) -> i64 {
        self.display_offset
    }

    /// Index of the frame on display (cursor plus preview offset).
    pub fn displayed_index(&self) -> usize {
        (self.history.cursor() as i64 + self.display_offset).max(0) as usize
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    /// Bumped every time a frame is (re)loaded.
    pub fn frame_generation(&self) -> u64 {
        self.frame_generation
    }

    pub fn frame_count(&self) -> usize {
        self.source.frame_count()
    }

    pub fn channels_per_timestamp(&self) -> Option<usize> {
        self.source.channels_per_timestamp()
    }

    pub fn history(&self) -> &History<U> {
        &self.history
    }

    pub fn anchor_mode(&self) -> AnchorMode {
        self.draw.anchor_mode()
    }

    pub fn autosave_interval(&self) -> usize {
        self.config.autosave_interval
    }

    /// Last save problem that did not stop the session.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn ended(&self) -> Option<SessionEnd> {
        self.ended
    }

    pub fn overlays(&self) -> Overlays {
        let shown = self.displayed_index();
        Overlays {
            others: U::other_objects(self.history.completed(), self.history.current(), shown),
            past: self.history.current().past_positions(shown),
            drawing: self.draw.preview_rectangle(),
        }
    }

    /// Apply one command.
    pub fn handle(&mut self, command: Command) -> Result<Outcome> {
        if let Some(reason) = self.ended {
            log::warn!("Ignoring {:?}: session already ended", command);
            return Ok(Outcome::Finished {
                reason,
                saved: None,
            });
        }

        match command {
            Command::PointerPressed { point, modifier } => self.draw.press(point, modifier),
            Command::PointerDragged(point) => self.draw.drag_to(point),
            Command::PointerReleased(point) => self.draw.end_drag(point),
            Command::Commit => return self.commit(),
            Command::NextUnit => return self.next_unit(),
            Command::Undo => return self.undo(),
            Command::Save {
                include_in_progress,
            } => {
                self.save(None, include_in_progress)?;
            }
            Command::Load(path) => {
                self.load(&path)?;
            }
            Command::Quit => {
                let saved = self.save(Some(FINAL_SUFFIX), false)?;
                self.ended = Some(SessionEnd::Quit);
                return Ok(Outcome::Finished {
                    reason: SessionEnd::Quit,
                    saved: Some(saved),
                });
            }
            Command::SetAnchorMode(mode) => self.draw.set_anchor_mode(mode),
            Command::SetDisplayOffset(offset) => return self.set_display_offset(offset),
            Command::ResetDisplayOffset => return self.set_display_offset(0),
            Command::SetAutosaveInterval(interval) => {
                log::info!("Autosave interval set to {}", interval);
                self.config.autosave_interval = interval;
            }
            Command::SetChannelsPerTimestamp(channels) => return self.set_channels(channels),
        }
        Ok(Outcome::Continue)
    }

    /// Record the drawn rectangle, or fall through to closing the unit.
    fn commit(&mut self) -> Result<Outcome> {
        match self.draw.current_rectangle() {
            Some(rect) => self.record(rect),
            None => self.next_unit(),
        }
    }

    fn record(&mut self, rect: Rect) -> Result<Outcome> {
        let frame = self.history.cursor();
        self.history
            .record_entry(AnnotationEntry::new(rect, self.cursor_ref.clone()));
        log::info!("Recorded {} on frame {} ({})", rect, frame, self.cursor_ref);

        let moved = self.history.cursor() != frame || self.display_offset != 0;
        self.draw.reset();
        self.display_offset = 0;
        if U::CLOSES_AT_SOURCE_END && self.history.cursor() >= self.source.frame_count() {
            log::info!("Reached the last frame, closing {}", U::NAME);
            return self.next_unit();
        }
        if moved {
            self.show_frame_or_finish()
        } else {
            Ok(Outcome::Continue)
        }
    }

    fn next_unit(&mut self) -> Result<Outcome> {
        let count = self.history.commit_unit(&self.cursor_ref);
        self.draw.reset();
        self.display_offset = 0;
        if autosave_due(count, self.config.autosave_interval) {
            self.autosave();
        }
        self.show_frame_or_finish()
    }

    fn undo(&mut self) -> Result<Outcome> {
        match self.history.undo() {
            UndoStep::Nothing => log::info!("Nothing to undo"),
            UndoStep::Unplaced => {
                self.last_error = Some(format!(
                    "Cannot undo into a {} that is not part of this source",
                    U::NAME
                ));
            }
            UndoStep::Reopened
                if U::CLOSES_AT_SOURCE_END
                    && self.history.cursor() >= self.source.frame_count() =>
            {
                // The unit was closed by recording on the last frame; take
                // that record back along with the close.
                self.history.undo();
            }
            UndoStep::Entry | UndoStep::Reopened => {}
        }
        self.draw.reset();
        self.display_offset = 0;
        self.show_frame_or_finish()
    }

    fn set_display_offset(&mut self, offset: i64) -> Result<Outcome> {
        if offset != 0 && !U::PREVIEWS_NEIGHBOURS {
            log::warn!("Previewing other frames is only available when tracking");
            return Ok(Outcome::Continue);
        }
        let cursor = self.history.cursor() as i64;
        let last = self.source.frame_count() as i64 - 1;
        let offset = offset
            .clamp(-PREVIEW_WINDOW, PREVIEW_WINDOW)
            .max(-cursor)
            .min(last - cursor);
        if offset == self.display_offset {
            return Ok(Outcome::Continue);
        }
        self.display_offset = offset;
        if offset != 0 {
            log::info!("Displaying frame {} instead of {}", cursor + offset, cursor);
        }
        self.show_frame_or_finish()
    }

    fn set_channels(&mut self, channels: usize) -> Result<Outcome> {
        let Some(previous) = self.source.channels_per_timestamp() else {
            log::warn!("This frame source has no channels to group");
            return Ok(Outcome::Continue);
        };
        self.source.set_channels_per_timestamp(channels);
        if self.history.cursor() >= self.source.frame_count() {
            log::warn!(
                "Grouping by {} channels would leave frame {} out of range, keeping {}",
                channels,
                self.history.cursor(),
                previous
            );
            self.source.set_channels_per_timestamp(previous);
            return Ok(Outcome::Continue);
        }
        self.display_offset = 0;
        self.show_frame_or_finish()
    }

    /// Index of every frame reference in the source.
    fn frame_indices(&self) -> HashMap<FrameRef, usize> {
        (0..self.source.frame_count())
            .filter_map(|index| Some((self.source.frame_ref(index).ok()?, index)))
            .collect()
    }

    /// Reload the displayed frame, ending the session if the cursor has run
    /// past the end of the source.
    fn show_frame_or_finish(&mut self) -> Result<Outcome> {
        match self.show_frame() {
            Ok(()) => Ok(Outcome::Continue),
            Err(err) if err.is_exhausted() => {
                log::warn!("{}; ending session", err);
                Ok(self.finish_exhausted())
            }
            Err(err) => Err(err).context("Failed to load frame"),
        }
    }

    fn show_frame(&mut self) -> Result<(), crate::io::error::FrameError> {
        let cursor_ref = self.source.frame_ref(self.history.cursor())?;
        let frame = self.source.frame(self.displayed_index())?;
        self.cursor_ref = cursor_ref;
        self.frame = Some(frame);
        self.frame_generation += 1;
        Ok(())
    }

    fn finish_exhausted(&mut self) -> Outcome {
        self.ended = Some(SessionEnd::Exhausted);
        let include_current = !self.history.current().is_empty();
        let saved = match self.save(Some(FINAL_SUFFIX), include_current) {
            Ok(path) => Some(path),
            Err(err) => {
                log::error!("Final save failed: {:#}", err);
                self.last_error = Some(format!("Final save failed: {err:#}"));
                None
            }
        };
        Outcome::Finished {
            reason: SessionEnd::Exhausted,
            saved,
        }
    }

    fn autosave(&mut self) {
        match self.save(Some(AUTOSAVE_SUFFIX), false) {
            Ok(_) => self.last_error = None,
            Err(err) => {
                log::error!("Autosave failed: {:#}", err);
                self.last_error = Some(format!("Autosave failed: {err:#}"));
            }
        }
    }

    /// Write the completed units (and optionally the current one) to a new
    /// timestamped file in the output directory.
    pub fn save(&self, suffix: Option<&str>, include_in_progress: bool) -> Result<PathBuf> {
        let now = chrono::Local::now().naive_local();
        let path = save_path(&self.config.output_dir, suffix, self.config.format, now);
        let in_progress = include_in_progress.then(|| {
            let mut unit = self.history.current().clone();
            unit.seal(self.history.cursor(), &self.cursor_ref);
            unit
        });
        save_units(self.history.completed(), in_progress.as_ref(), &path)
            .with_context(|| format!("Failed to save annotations to {}", path.display()))?;
        log::info!(
            "Saved {} {}s to {}",
            self.history.completed().len() + usize::from(in_progress.is_some()),
            U::NAME,
            path.display()
        );
        Ok(path)
    }

    /// Replace the completed units with those stored in `path`. Leaves the
    /// session untouched if the file cannot be read in full.
    pub fn load(&mut self, path: &Path) -> Result<usize> {
        let units: Vec<U> = load_units(path)
            .with_context(|| format!("Failed to load annotations from {}", path.display()))?;
        let count = units.len();
        let frames = self.frame_indices();
        self.history
            .replace_completed(units, &|reference| frames.get(reference).copied());
        log::info!("Loaded {} {}s from {}", count, U::NAME, path.display());
        Ok(count)
    }
}
