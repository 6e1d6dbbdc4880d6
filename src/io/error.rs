// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Error types for frame sources and annotation files.

use crate::models::annotation::Rect;
use thiserror::Error;

/// Errors raised while reading frames.
#[derive(Error, Debug)]
pub enum FrameError {
    /// The source has no frame at this index; annotation cannot go further.
    #[error("Frame {index} is past the end of the source ({count} frames)")]
    OutOfRange { index: usize, count: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    /// Input that no frame source knows how to read
    #[error("Unsupported input: {0}")]
    Unsupported(String),
}

impl FrameError {
    /// Whether this error only means the frames ran out.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, FrameError::OutOfRange { .. })
    }
}

/// Errors raised while reading or writing annotation files.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A stored rectangle without positive extent
    #[error("Invalid rectangle {rect} on frame '{frame}'")]
    InvalidRect { frame: String, rect: Rect },
}
