// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Toolbar with session controls.
//!
//! This module provides the buttons and toggles along the top of the
//! window: validating, skipping, undoing and saving, the rectangle anchor
//! mode, overlay visibility and the autosave interval.

use super::ViewOptions;
use crate::io::media::MAX_CHANNELS_PER_TIMESTAMP;
use crate::session::draw::AnchorMode;
use crate::session::Command;

/// Result of toolbar interaction.
pub enum ToolbarAction {
    None,
    Command(Command),
    /// Ask the user for an annotation file to load.
    OpenLoadDialog,
}

/// Values the toolbar displays and edits.
pub struct ToolbarState<'a> {
    pub unit_name: &'a str,
    pub anchor_mode: AnchorMode,
    pub autosave_interval: usize,
    pub channels: Option<usize>,
    pub view: &'a mut ViewOptions,
}

/// Display the toolbar.
pub fn show(ui: &mut egui::Ui, state: ToolbarState<'_>) -> ToolbarAction {
    let mut action = ToolbarAction::None;
    let mut send = |command: Command| action = ToolbarAction::Command(command);
    let mut load_requested = false;

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 8.0;

        if ui.button("Save").on_hover_text("S").clicked() {
            send(Command::Save {
                include_in_progress: false,
            });
        }
        if ui.button("Save (include current)").clicked() {
            send(Command::Save {
                include_in_progress: true,
            });
        }
        if ui.button("Undo").on_hover_text("Z").clicked() {
            send(Command::Undo);
        }
        if ui.button("Validate").on_hover_text("Space").clicked() {
            send(Command::Commit);
        }
        if ui.button(format!("Next {}", state.unit_name)).clicked() {
            send(Command::NextUnit);
        }

        ui.separator();

        ui.label("Draw from:");
        let mut anchor = state.anchor_mode;
        ui.radio_value(&mut anchor, AnchorMode::FromCorner, "Top left corner");
        ui.radio_value(&mut anchor, AnchorMode::FromCenter, "Center");
        if anchor != state.anchor_mode {
            send(Command::SetAnchorMode(anchor));
        }

        ui.separator();

        ui.checkbox(&mut state.view.show_others, "Display other objects");
        ui.checkbox(&mut state.view.show_past, "Display past positions");

        ui.separator();

        let mut interval = state.autosave_interval;
        ui.label("Autosave every");
        ui.add(egui::DragValue::new(&mut interval).clamp_range(0..=1000));
        if interval != state.autosave_interval {
            send(Command::SetAutosaveInterval(interval));
        }

        if let Some(current) = state.channels {
            let mut channels = current;
            ui.label("Channels");
            ui.add(egui::Slider::new(&mut channels, 1..=MAX_CHANNELS_PER_TIMESTAMP));
            if channels != current {
                send(Command::SetChannelsPerTimestamp(channels));
            }
        }

        ui.separator();

        if ui.button("Load...").clicked() {
            load_requested = true;
        }
        if ui.button("Quit").clicked() {
            send(Command::Quit);
        }
    });

    if load_requested {
        return ToolbarAction::OpenLoadDialog;
    }
    action
}
