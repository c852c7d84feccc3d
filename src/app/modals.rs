//! Detail overlay rendering

use super::App;
use crate::theme;
use crate::ui::components::fit_size;
use apod_gallery::gallery::{Dismiss, OverlayMedia};
use eframe::egui;
use tracing::{info, warn};

impl App {
    pub fn render_overlay(&mut self, ctx: &egui::Context) {
        let Some(overlay) = self.overlay.current().cloned() else {
            return;
        };
        let mut dismiss: Option<Dismiss> = None;

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            dismiss = Some(Dismiss::Escape);
        }

        // Dim backdrop - blocks the grid and closes on click
        let screen = ctx.screen_rect();
        let backdrop = egui::Area::new(egui::Id::new("overlay_dim"))
            .fixed_pos(screen.min)
            .order(egui::Order::Middle)
            .interactable(true)
            .show(ctx, |ui| {
                let response = ui.allocate_response(screen.size(), egui::Sense::click());
                ui.painter().rect_filled(screen, 0.0, egui::Color32::from_black_alpha(180));
                response
            });
        if backdrop.inner.clicked() {
            dismiss.get_or_insert(Dismiss::Backdrop);
        }

        let width = (screen.width() - 64.0).clamp(320.0, theme::OVERLAY_MAX_WIDTH);
        let media_max = egui::vec2(width, theme::OVERLAY_IMG_HEIGHT.min(screen.height() * 0.55));

        egui::Area::new(egui::Id::new("overlay_content"))
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                theme::modal_frame().show(ui, |ui| {
                    ui.set_width(width);

                    // Header: title, date, close
                    ui.horizontal(|ui| {
                        ui.vertical(|ui| {
                            ui.label(
                                egui::RichText::new(overlay.title())
                                    .size(theme::FONT_TITLE)
                                    .strong()
                                    .color(theme::TEXT_PRIMARY),
                            );
                            ui.label(
                                egui::RichText::new(overlay.date())
                                    .size(theme::FONT_LABEL)
                                    .color(theme::ACCENT_LIGHT),
                            );
                        });
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::TOP), |ui| {
                            let close = ui
                                .add(
                                    egui::Button::new(egui::RichText::new(egui_phosphor::regular::X).size(18.0))
                                        .frame(false),
                                )
                                .on_hover_text("Close");
                            if close.clicked() {
                                dismiss = Some(Dismiss::CloseButton);
                            }
                        });
                    });
                    ui.add_space(theme::SPACING_LG);

                    ui.vertical_centered(|ui| match &overlay.media {
                        OverlayMedia::Image(url) => self.render_overlay_image(ui, url, media_max),
                        OverlayMedia::Video(url) => render_video_link(ui, url, media_max),
                        OverlayMedia::Missing => {
                            media_placeholder(ui, media_max, egui_phosphor::regular::IMAGE, "No media available.");
                        }
                    });
                    ui.add_space(theme::SPACING_LG);

                    egui::ScrollArea::vertical()
                        .id_salt("overlay_explanation")
                        .max_height((screen.height() * 0.2).max(80.0))
                        .show(ui, |ui| {
                            ui.add(
                                egui::Label::new(
                                    egui::RichText::new(overlay.explanation())
                                        .size(theme::FONT_BODY)
                                        .color(theme::TEXT_SECONDARY),
                                )
                                .wrap(),
                            );
                        });
                });
            });

        if let Some(reason) = dismiss {
            self.overlay.dismiss(reason);
        }
    }

    fn render_overlay_image(&self, ui: &mut egui::Ui, url: &str, max: egui::Vec2) {
        if let Some(loaded) = self.images.get(url) {
            let size = fit_size(loaded.full.size_vec2(), max);
            ui.image(egui::load::SizedTexture::new(loaded.full.id(), size));
        } else if self.failed_images.contains(url) {
            media_placeholder(ui, max, egui_phosphor::regular::IMAGE_BROKEN, "Image could not be loaded.");
        } else {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(max.x, max.y * 0.6), egui::Sense::hover());
            ui.painter().rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
            let spinner_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(32.0, 32.0));
            egui::Spinner::new().color(theme::ACCENT).paint_at(ui, spinner_rect);
        }
    }
}

fn render_video_link(ui: &mut egui::Ui, url: &str, max: egui::Vec2) {
    theme::section_frame().show(ui, |ui| {
        ui.set_width(max.x - theme::SPACING_XL * 2.0);
        ui.vertical_centered(|ui| {
            ui.add_space(theme::SPACING_XL);
            ui.label(
                egui::RichText::new(egui_phosphor::regular::PLAY_CIRCLE)
                    .size(48.0)
                    .color(theme::ACCENT),
            );
            ui.add_space(theme::SPACING_MD);
            ui.label(egui::RichText::new("This entry is a video.").color(theme::TEXT_MUTED));
            ui.add_space(theme::SPACING_MD);
            if ui.add(theme::button("Watch video")).clicked() {
                info!(url, "Opening video");
                if let Err(e) = open::that(url) {
                    warn!(url, error = %e, "Failed to open video");
                }
            }
            ui.add_space(theme::SPACING_SM);
            ui.label(egui::RichText::new(url).size(theme::FONT_CAPTION).color(theme::TEXT_DIM));
            ui.add_space(theme::SPACING_XL);
        });
    });
}

fn media_placeholder(ui: &mut egui::Ui, max: egui::Vec2, icon: &str, text: &str) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(max.x, max.y * 0.4), egui::Sense::hover());
    let painter = ui.painter();
    painter.rect_filled(rect, theme::RADIUS_DEFAULT, theme::BG_SURFACE);
    painter.text(
        rect.center() - egui::vec2(0.0, 14.0),
        egui::Align2::CENTER_CENTER,
        icon,
        egui::FontId::proportional(32.0),
        theme::TEXT_DIM,
    );
    painter.text(
        rect.center() + egui::vec2(0.0, 18.0),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(theme::FONT_LABEL),
        theme::TEXT_MUTED,
    );
}
