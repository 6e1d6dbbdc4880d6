// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Drawing canvas for frame display and rectangle annotation.
//!
//! This module shows the current frame scaled to fit, paints the
//! annotation overlays on top and reports secondary-button drags in frame
//! pixel coordinates.

use super::ViewOptions;
use crate::models::annotation::{Point, Rect};
use crate::session::Overlays;
use crate::util::geometry::{fit_scale, pixel_to_screen, screen_to_pixel};

const OTHERS_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 0, 0);
const PAST_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 100, 0);
const DRAWING_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 0, 200);

/// Result of canvas interaction.
pub enum CanvasAction {
    None,
    Press { point: Point, modifier: bool },
    Drag(Point),
    Release(Point),
}

/// Display the frame and overlays, and translate pointer drags.
pub fn show(
    ui: &mut egui::Ui,
    texture: Option<&egui::TextureHandle>,
    image_size: Option<(u32, u32)>,
    overlays: &Overlays,
    view: &ViewOptions,
    banner: Option<&str>,
) -> CanvasAction {
    let mut action = CanvasAction::None;
    ui.style_mut().visuals.extreme_bg_color = egui::Color32::from_gray(40);

    let available_size = ui.available_size();

    egui::Frame::canvas(ui.style()).show(ui, |ui| {
        ui.set_min_size(available_size);

        let (Some(texture), Some((img_width, img_height))) = (texture, image_size) else {
            ui.centered_and_justified(|ui| {
                ui.label(egui::RichText::new("Loading frame...").color(egui::Color32::WHITE));
            });
            return;
        };

        let available = ui.available_size();
        let scale = fit_scale((img_width, img_height), (available.x, available.y));
        let display_size = egui::vec2(img_width as f32 * scale, img_height as f32 * scale);
        let offset = (available - display_size) / 2.0;
        let image_rect = egui::Rect::from_min_size(ui.min_rect().min + offset, display_size);
        let origin = (image_rect.min.x, image_rect.min.y);

        ui.painter().image(
            texture.id(),
            image_rect,
            egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            egui::Color32::WHITE,
        );

        let response = ui.allocate_rect(image_rect, egui::Sense::drag());
        let to_pixel = |pos: egui::Pos2| screen_to_pixel((pos.x, pos.y), origin, scale);
        let button = egui::PointerButton::Secondary;

        if response.drag_stopped_by(button) {
            let pos = response
                .interact_pointer_pos()
                .or_else(|| ui.input(|i| i.pointer.latest_pos()));
            if let Some(pos) = pos {
                action = CanvasAction::Release(to_pixel(pos));
            }
        } else if response.drag_started_by(button) {
            let (origin_pos, modifier) = ui.input(|i| (i.pointer.press_origin(), i.modifiers.command));
            if let Some(pos) = origin_pos {
                action = CanvasAction::Press {
                    point: to_pixel(pos),
                    modifier,
                };
            }
        } else if response.dragged_by(button) {
            if let Some(pos) = response.interact_pointer_pos() {
                action = CanvasAction::Drag(to_pixel(pos));
            }
        }

        let painter = ui.painter_at(image_rect);
        if view.show_others {
            for rect in &overlays.others {
                draw_rect(&painter, rect, origin, scale, OTHERS_COLOR);
            }
        }
        if view.show_past {
            for rect in &overlays.past {
                draw_rect(&painter, rect, origin, scale, PAST_COLOR);
            }
        }
        if let Some(rect) = &overlays.drawing {
            draw_rect(&painter, rect, origin, scale, DRAWING_COLOR);
        }

        if let Some(text) = banner {
            painter.text(
                image_rect.left_top() + egui::vec2(8.0, 8.0),
                egui::Align2::LEFT_TOP,
                text,
                egui::FontId::proportional(16.0),
                egui::Color32::YELLOW,
            );
        }
    });

    action
}

/// Draw one annotation rectangle on the canvas.
fn draw_rect(
    painter: &egui::Painter,
    rect: &Rect,
    origin: (f32, f32),
    scale: f32,
    color: egui::Color32,
) {
    let (x0, y0) = pixel_to_screen(rect.start, origin, scale);
    let (x1, y1) = pixel_to_screen(rect.end, origin, scale);
    painter.rect_stroke(
        egui::Rect::from_min_max(egui::pos2(x0, y0), egui::pos2(x1, y1)),
        0.0,
        egui::Stroke::new(1.5, color),
    );
}
