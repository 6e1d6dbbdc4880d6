// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Command line arguments.

use crate::config::{AnnotationMode, SessionConfig, DEFAULT_AUTOSAVE_INTERVAL};
use crate::io::serialization::DocumentFormat;
use crate::session::draw::AnchorMode;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about,
    long_about = "Draw bounding boxes over a folder of images or a multi-page TIFF.\n\
                  Secondary-drag draws, Ctrl+secondary-drag moves the nearest corner,\n\
                  Space validates (or skips to the next unit when nothing is drawn),\n\
                  Z undoes, S saves."
)]
pub struct Args {
    /// Folder of images or multi-page TIFF file.
    pub input: PathBuf,
    /// Annotate all objects per frame, or one object across frames.
    #[arg(long, value_enum, default_value_t = AnnotationMode::Detection)]
    pub mode: AnnotationMode,
    /// Frame to start from (and return to after each tracked object).
    #[arg(long, default_value_t = 0)]
    pub start_frame: usize,
    /// Autosave after this many completed units (0 disables).
    #[arg(long, default_value_t = DEFAULT_AUTOSAVE_INTERVAL)]
    pub autosave_interval: usize,
    /// Whether the press point is the rectangle centre or a corner.
    #[arg(long, value_enum, default_value_t = AnchorArg::Center)]
    pub anchor: AnchorArg,
    /// Directory save files are written to.
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
    /// Save file format.
    #[arg(long, value_enum, default_value_t = FormatArg::Json)]
    pub format: FormatArg,
    /// Previously saved annotations to continue from.
    #[arg(long)]
    pub load: Option<PathBuf>,
    /// Pages per timestamp for multi-page files.
    #[arg(long)]
    pub channels: Option<usize>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorArg {
    Center,
    Corner,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Json,
    Yaml,
}

impl Args {
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            starting_frame: self.start_frame,
            autosave_interval: self.autosave_interval,
            anchor_mode: match self.anchor {
                AnchorArg::Center => AnchorMode::FromCenter,
                AnchorArg::Corner => AnchorMode::FromCorner,
            },
            output_dir: self.output_dir.clone(),
            format: match self.format {
                FormatArg::Json => DocumentFormat::Json,
                FormatArg::Yaml => DocumentFormat::Yaml,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_session_defaults() {
        let args = Args::try_parse_from(["boxtrack", "frames/"]).unwrap();
        assert_eq!(args.mode, AnnotationMode::Detection);
        assert_eq!(args.session_config(), SessionConfig::default());
    }

    #[test]
    fn test_tracking_options() {
        let args = Args::try_parse_from([
            "boxtrack",
            "stack.tif",
            "--mode",
            "tracking",
            "--start-frame",
            "5",
            "--anchor",
            "corner",
            "--format",
            "yaml",
            "--channels",
            "2",
        ])
        .unwrap();
        let config = args.session_config();
        assert_eq!(args.mode, AnnotationMode::Tracking);
        assert_eq!(args.channels, Some(2));
        assert_eq!(config.starting_frame, 5);
        assert_eq!(config.anchor_mode, AnchorMode::FromCorner);
        assert_eq!(config.format, DocumentFormat::Yaml);
    }
}
