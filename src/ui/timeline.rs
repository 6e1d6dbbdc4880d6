// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame preview scrubber.
//!
//! In tracking mode this lets the user look at frames around the cursor
//! without moving it. The slider spans the preview window around the
//! cursor and snaps back whenever the session resets the offset.

use crate::session::{Command, PREVIEW_WINDOW};

/// Display the scrubber. Returns a command when the offset was changed.
pub fn show(ui: &mut egui::Ui, cursor: usize, offset: i64, frame_count: usize) -> Option<Command> {
    let mut command = None;
    let cursor = cursor as i64;
    let first = (cursor - PREVIEW_WINDOW).max(0);
    let last = (cursor + PREVIEW_WINDOW).min(frame_count as i64 - 1).max(first);

    ui.horizontal(|ui| {
        let mut shown = cursor + offset;
        ui.label("Frame");
        let slider = egui::Slider::new(&mut shown, first..=last).clamp_to_range(true);
        if ui.add(slider).changed() {
            command = Some(Command::SetDisplayOffset(shown - cursor));
        }
        if ui
            .add_enabled(offset != 0, egui::Button::new("Reset frame display offset"))
            .clicked()
        {
            command = Some(Command::ResetDisplayOffset);
        }
        if offset != 0 {
            ui.colored_label(
                egui::Color32::YELLOW,
                format!("Displaying frame {} instead of {}", cursor + offset, cursor),
            );
        }
    });

    command
}
