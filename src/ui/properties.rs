// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Session status panel.
//!
//! Shows where the cursor is, how much has been annotated so far and the
//! most recent problem worth the user's attention.

/// Snapshot of the session shown in the panel.
pub struct SessionStatus<'a> {
    pub unit_name: &'a str,
    pub frame_ref: Option<&'a str>,
    pub cursor: usize,
    pub frame_count: usize,
    pub completed: usize,
    pub current_entries: usize,
    pub message: Option<&'a str>,
}

/// Display the status panel.
pub fn show(ui: &mut egui::Ui, status: &SessionStatus<'_>) {
    ui.heading("Session");
    ui.separator();

    egui::Grid::new("session_status").num_columns(2).show(ui, |ui| {
        ui.label("Frame");
        ui.label(format!("{} / {}", status.cursor, status.frame_count));
        ui.end_row();

        ui.label("Reference");
        ui.label(status.frame_ref.unwrap_or("-"));
        ui.end_row();

        ui.label(format!("Completed {}s", status.unit_name));
        ui.label(status.completed.to_string());
        ui.end_row();

        ui.label(format!("Current {}", status.unit_name));
        ui.label(format!("{} rectangles", status.current_entries));
        ui.end_row();
    });

    if let Some(message) = status.message {
        ui.separator();
        ui.colored_label(egui::Color32::LIGHT_RED, message);
    }
}
