// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! boxtrack - bounding box annotation for image sequences
//!
//! A desktop tool for drawing rectangles over a folder of images or a
//! multi-page TIFF, either every object per frame (detection) or one
//! object across frames (tracking).

mod app;
mod cli;
mod config;
mod io;
mod models;
mod session;
mod ui;
mod util;

use anyhow::{Context, Result};
use app::AnnotatorApp;
use clap::Parser;
use cli::Args;
use config::AnnotationMode;
use io::media::{open_source, FrameSource};
use io::serialization::Codec;
use models::unit::{FrameObjects, ObjectTrack};
use session::Session;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let mut source = open_source(&args.input)
        .with_context(|| format!("Cannot open {}", args.input.display()))?;
    if let Some(channels) = args.channels {
        if !source.set_channels_per_timestamp(channels) {
            log::warn!(
                "Ignoring --channels {}: {} has no interleaved channels",
                channels,
                args.input.display()
            );
        }
    }

    match args.mode {
        AnnotationMode::Detection => run::<FrameObjects>(&args, source),
        AnnotationMode::Tracking => run::<ObjectTrack>(&args, source),
    }
}

/// Build the session for unit type `U` and hand it to the window.
fn run<U: Codec + 'static>(args: &Args, source: Box<dyn FrameSource>) -> Result<()> {
    let mut session = Session::<U>::new(args.session_config(), source)?;
    if let Some(path) = &args.load {
        session.load(path)?;
    }

    // Configure egui options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title(format!("boxtrack - {}", args.input.display())),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "boxtrack",
        options,
        Box::new(|_cc| Ok(Box::new(AnnotatorApp::new(session)))),
    )
    .map_err(|e| anyhow::anyhow!("Application error: {}", e))?;

    Ok(())
}
