//! Reusable UI components
//!
//! This module contains standalone UI components that can be used
//! throughout the application.

use crate::theme;
use eframe::egui;

/// UV rect that crops a texture to fill `target` without stretching
pub fn cover_uv(tex_size: egui::Vec2, target: egui::Vec2) -> egui::Rect {
    let full = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
    if tex_size.x <= 0.0 || tex_size.y <= 0.0 || target.x <= 0.0 || target.y <= 0.0 {
        return full;
    }
    let tex_aspect = tex_size.x / tex_size.y;
    let target_aspect = target.x / target.y;
    if tex_aspect > target_aspect {
        // Wider than the slot: trim left and right
        let w = target_aspect / tex_aspect;
        let x0 = (1.0 - w) / 2.0;
        egui::Rect::from_min_max(egui::pos2(x0, 0.0), egui::pos2(x0 + w, 1.0))
    } else {
        let h = tex_aspect / target_aspect;
        let y0 = (1.0 - h) / 2.0;
        egui::Rect::from_min_max(egui::pos2(0.0, y0), egui::pos2(1.0, y0 + h))
    }
}

/// Largest size with the texture's aspect ratio that fits inside `max`
pub fn fit_size(tex_size: egui::Vec2, max: egui::Vec2) -> egui::Vec2 {
    if tex_size.x <= 0.0 || tex_size.y <= 0.0 {
        return egui::Vec2::ZERO;
    }
    let scale = (max.x / tex_size.x).min(max.y / tex_size.y).min(1.0);
    tex_size * scale
}

/// Outcome of a date field this frame
pub struct DateFieldResponse {
    /// The value was committed (enter, focus lost after edit, or cleared)
    pub committed: bool,
}

/// Labelled `YYYY-MM-DD` text field with a clear button
pub fn date_field(ui: &mut egui::Ui, label: &str, value: &mut String, id: &str) -> DateFieldResponse {
    let mut committed = false;

    ui.add(
        egui::Label::new(egui::RichText::new(label).color(theme::TEXT_DIM).size(theme::FONT_SMALL))
            .selectable(false),
    );
    let frame_resp = egui::Frame::new()
        .fill(theme::BG_INPUT)
        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE))
        .corner_radius(theme::RADIUS_DEFAULT)
        .inner_margin(egui::Margin::symmetric(8, 6))
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(egui_phosphor::regular::CALENDAR_BLANK)
                            .size(14.0)
                            .color(theme::TEXT_DIM),
                    )
                    .selectable(false),
                );
                let field_id = ui.make_persistent_id(id);
                let response = ui.add(
                    egui::TextEdit::singleline(value)
                        .id(field_id)
                        .hint_text("YYYY-MM-DD")
                        .char_limit(10)
                        .frame(false)
                        .desired_width(ui.available_width() - 20.0),
                );

                // Remember edits until the field loses focus, like a change event
                let dirty_id = field_id.with("dirty");
                if response.changed() {
                    ui.ctx().data_mut(|d| d.insert_temp(dirty_id, true));
                }
                if response.lost_focus() {
                    let dirty = ui.ctx().data_mut(|d| d.remove_temp::<bool>(dirty_id)).unwrap_or(false);
                    committed |= dirty;
                }
            });
        });

    if !value.is_empty() {
        let frame_rect = frame_resp.response.rect;
        let btn_rect = egui::Rect::from_center_size(
            egui::pos2(frame_rect.right() - 14.0, frame_rect.center().y),
            egui::vec2(16.0, 16.0),
        );
        let clear_resp = ui.interact(btn_rect, ui.id().with(id).with("clear"), egui::Sense::click());
        let color = if clear_resp.hovered() { theme::TEXT_MUTED } else { theme::TEXT_DIM };
        if clear_resp.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        }
        ui.painter().text(
            btn_rect.center(),
            egui::Align2::CENTER_CENTER,
            egui_phosphor::regular::X,
            egui::FontId::proportional(12.0),
            color,
        );
        if clear_resp.clicked() {
            value.clear();
            committed = true;
        }
    }

    DateFieldResponse { committed }
}
