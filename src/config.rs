// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session configuration.

use crate::io::serialization::DocumentFormat;
use crate::session::draw::AnchorMode;
use std::path::PathBuf;

/// Completed units between two autosaves.
pub const DEFAULT_AUTOSAVE_INTERVAL: usize = 10;

/// What one unit of work is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum AnnotationMode {
    /// Annotate every object on a frame, then move to the next frame.
    #[default]
    Detection,
    /// Follow one object through the frames, then start the next object.
    Tracking,
}

/// Settings a session is created with.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Frame the cursor starts on, and returns to after each tracked object.
    pub starting_frame: usize,
    /// Autosave after every this many completed units; 0 disables.
    pub autosave_interval: usize,
    pub anchor_mode: AnchorMode,
    /// Directory save files are written to.
    pub output_dir: PathBuf,
    pub format: DocumentFormat,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_frame: 0,
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            anchor_mode: AnchorMode::default(),
            output_dir: PathBuf::from("."),
            format: DocumentFormat::default(),
        }
    }
}
