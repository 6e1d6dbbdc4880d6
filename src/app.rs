// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! This module wires the annotation session to the window: it turns key
//! presses, toolbar clicks and canvas drags into session commands, reacts
//! to their outcomes and keeps the displayed texture in step with the
//! frame the session is showing.

use crate::io::serialization::Codec;
use crate::models::unit::Unit;
use crate::session::{Command, Outcome, Session, SessionEnd};
use crate::ui::{canvas, properties, timeline, toolbar, ViewOptions};

/// Main application state.
pub struct AnnotatorApp<U: Codec> {
    session: Session<U>,

    /// Overlay visibility toggles
    view: ViewOptions,

    /// Texture of the displayed frame
    texture: Option<egui::TextureHandle>,

    /// Frame generation the texture was built from
    texture_generation: Option<u64>,

    /// Displayed frame dimensions (width, height)
    image_size: Option<(u32, u32)>,

    /// Last informational message for the status panel
    status: Option<String>,
}

impl<U: Codec> AnnotatorApp<U> {
    pub fn new(session: Session<U>) -> Self {
        Self {
            session,
            view: ViewOptions::default(),
            texture: None,
            texture_generation: None,
            image_size: None,
            status: None,
        }
    }

    /// Rebuild the texture when the session moved to another frame.
    fn sync_texture(&mut self, ctx: &egui::Context) {
        let generation = self.session.frame_generation();
        if self.texture_generation == Some(generation) {
            return;
        }
        self.texture_generation = Some(generation);

        let Some(frame) = self.session.frame() else {
            self.texture = None;
            self.image_size = None;
            return;
        };

        let (width, height) = frame.image.dimensions();
        let size = [width as usize, height as usize];
        let color_image = egui::ColorImage::from_rgba_unmultiplied(size, frame.image.as_raw());
        match &mut self.texture {
            Some(texture) => texture.set(color_image, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture(
                    "frame",
                    color_image,
                    egui::TextureOptions::NEAREST,
                ));
            }
        }
        self.image_size = Some((width, height));
        log::debug!("Displaying {} ({}x{})", frame.reference, width, height);
    }

    /// Send a command to the session and react to the outcome.
    fn dispatch(&mut self, ctx: &egui::Context, command: Command) {
        match self.session.handle(command) {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Finished { reason, saved }) => {
                if let Some(path) = &saved {
                    self.status = Some(format!("Saved {}", path.display()));
                }
                match reason {
                    SessionEnd::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
                    SessionEnd::Exhausted => {
                        log::info!("No frames left to annotate");
                    }
                }
            }
            Err(e) => {
                log::error!("{:#}", e);
                self.status = Some(format!("{:#}", e));
            }
        }
    }

    /// Ask for an annotation file and load it.
    fn open_load_dialog(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Annotations", &["json", "yaml", "yml"])
            .pick_file()
        {
            self.dispatch(ctx, Command::Load(path));
        }
    }

    /// Keyboard shortcuts, ignored while a text field has focus.
    fn handle_keys(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (commit, save, undo) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::Space),
                i.key_pressed(egui::Key::S),
                i.key_pressed(egui::Key::Z),
            )
        });
        if commit {
            self.dispatch(ctx, Command::Commit);
        }
        if save {
            self.dispatch(
                ctx,
                Command::Save {
                    include_in_progress: false,
                },
            );
        }
        if undo {
            self.dispatch(ctx, Command::Undo);
        }
    }

    /// Quitting from the window's close button saves like the Quit button.
    fn handle_close_request(&mut self, ctx: &egui::Context) {
        if !ctx.input(|i| i.viewport().close_requested()) || self.session.ended().is_some() {
            return;
        }
        if let Err(e) = self.session.handle(Command::Quit) {
            log::error!("Not quitting: {:#}", e);
            self.status = Some(format!("Not quitting: {:#}", e));
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }
    }
}

impl<U: Codec> eframe::App for AnnotatorApp<U> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_close_request(ctx);
        self.handle_keys(ctx);
        self.sync_texture(ctx);

        // Toolbar
        let toolbar_action = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| {
                toolbar::show(
                    ui,
                    toolbar::ToolbarState {
                        unit_name: U::NAME,
                        anchor_mode: self.session.anchor_mode(),
                        autosave_interval: self.session.autosave_interval(),
                        channels: self.session.channels_per_timestamp(),
                        view: &mut self.view,
                    },
                )
            })
            .inner;

        match toolbar_action {
            toolbar::ToolbarAction::None => {}
            toolbar::ToolbarAction::Command(command) => self.dispatch(ctx, command),
            toolbar::ToolbarAction::OpenLoadDialog => self.open_load_dialog(ctx),
        }

        // Status panel (right side)
        egui::SidePanel::right("properties")
            .default_width(220.0)
            .show(ctx, |ui| {
                let history = self.session.history();
                let message = self
                    .status
                    .as_deref()
                    .or_else(|| self.session.last_error());
                properties::show(
                    ui,
                    &properties::SessionStatus {
                        unit_name: U::NAME,
                        frame_ref: self.session.frame().map(|f| f.reference.as_str()),
                        cursor: self.session.cursor(),
                        frame_count: self.session.frame_count(),
                        completed: history.completed().len(),
                        current_entries: history.current().len(),
                        message,
                    },
                );
            });

        // Frame scrubber, only where neighbouring frames matter
        if U::PREVIEWS_NEIGHBOURS {
            let timeline_command = egui::TopBottomPanel::bottom("timeline")
                .show(ctx, |ui| {
                    timeline::show(
                        ui,
                        self.session.cursor(),
                        self.session.display_offset(),
                        self.session.frame_count(),
                    )
                })
                .inner;
            if let Some(command) = timeline_command {
                self.dispatch(ctx, command);
            }
        }

        // Commands above may have moved the session to another frame
        self.sync_texture(ctx);

        let overlays = self.session.overlays();
        let banner = match self.session.ended() {
            Some(SessionEnd::Exhausted) => Some("All frames annotated. Close the window to exit."),
            _ => None,
        };

        // Main canvas (center)
        let canvas_action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                canvas::show(
                    ui,
                    self.texture.as_ref(),
                    self.image_size,
                    &overlays,
                    &self.view,
                    banner,
                )
            })
            .inner;

        let command = match canvas_action {
            canvas::CanvasAction::None => None,
            canvas::CanvasAction::Press { point, modifier } => {
                Some(Command::PointerPressed { point, modifier })
            }
            canvas::CanvasAction::Drag(point) => Some(Command::PointerDragged(point)),
            canvas::CanvasAction::Release(point) => Some(Command::PointerReleased(point)),
        };
        if let Some(command) = command {
            if self.session.ended().is_none() {
                self.dispatch(ctx, command);
            }
        }
    }
}
