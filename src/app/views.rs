//! Sidebar and gallery grid rendering

use super::App;
use crate::theme;
use crate::ui::components::{cover_uv, date_field};
use apod_gallery::constants::{CAPTION_CHARS, EMPTY_MESSAGE};
use apod_gallery::gallery::DisplayState;
use apod_gallery::utils::{rasterize_logo, truncate_caption};
use apod_gallery::Entry;
use eframe::egui;

const TITLE_CHARS: usize = 48;

impl App {
    pub fn render_sidebar(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("range_panel")
            .exact_width(theme::SIDEBAR_WIDTH)
            .resizable(false)
            .show_separator_line(false)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin { left: 16, right: 0, top: 0, bottom: 16 }),
            )
            .show(ctx, |ui| {
                ui.set_max_width(theme::SIDEBAR_WIDTH - theme::SPACING_XL);
                let avail_w = ui.available_width();

                ui.add_space(21.0);
                ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
                    if self.logo_texture.is_none() {
                        self.logo_texture = rasterize_logo(avail_w as u32 * 2).map(|(pixels, w, h)| {
                            ctx.load_texture(
                                "logo",
                                egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], &pixels),
                                egui::TextureOptions::LINEAR,
                            )
                        });
                    }
                    if let Some(texture) = &self.logo_texture {
                        let aspect = texture.size()[1] as f32 / texture.size()[0] as f32;
                        let logo_w = avail_w * 0.5;
                        ui.image(egui::load::SizedTexture::new(texture.id(), egui::vec2(logo_w, logo_w * aspect)));
                    }

                    ui.add_space(theme::SPACING_SM);
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new("ASTRONOMY PICTURE OF THE DAY")
                                .size(theme::FONT_SMALL)
                                .color(theme::TEXT_DIM),
                        )
                        .selectable(false),
                    );
                });
                ui.add_space(theme::SPACING_LG);

                let mut run = false;
                theme::section_frame().show(ui, |ui| {
                    ui.set_width(ui.available_width());
                    run |= date_field(ui, "Start date", &mut self.start_date, "start_date").committed;
                    ui.add_space(theme::SPACING_MD);
                    run |= date_field(ui, "End date", &mut self.end_date, "end_date").committed;
                    ui.add_space(theme::SPACING_LG);

                    let label = format!("{}  Fetch Space Images", egui_phosphor::regular::ROCKET_LAUNCH);
                    let button = theme::button_accent(label)
                        .min_size(egui::vec2(ui.available_width(), theme::BUTTON_HEIGHT_LARGE));
                    if ui.add(button).clicked() {
                        run = true;
                    }
                });
                if run {
                    self.request_range(ctx);
                }

                ui.add_space(theme::SPACING_XL);
                self.render_fact(ui);
            });
    }

    fn render_fact(&self, ui: &mut egui::Ui) {
        if self.fact.is_empty() {
            return;
        }
        theme::section_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new(egui_phosphor::regular::LIGHTBULB)
                        .size(theme::FONT_BODY)
                        .color(theme::ACCENT_LIGHT),
                );
                ui.label(
                    egui::RichText::new("Did You Know?")
                        .size(theme::FONT_LABEL)
                        .strong()
                        .color(theme::TEXT_SECONDARY),
                );
            });
            ui.add_space(theme::SPACING_SM);
            ui.add(
                egui::Label::new(egui::RichText::new(self.fact).size(theme::FONT_LABEL).color(theme::TEXT_MUTED))
                    .wrap(),
            );
        });
    }

    pub fn render_gallery(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(theme::BG_BASE).inner_margin(egui::Margin::same(16)))
            .show(ctx, |ui| match self.gallery.surface().clone() {
                DisplayState::Idle => {
                    status_message(ui, egui_phosphor::regular::CALENDAR_BLANK, "Pick a date range and fetch space images.", theme::TEXT_DIM);
                }
                DisplayState::Loading => {
                    ui.vertical_centered(|ui| {
                        ui.add_space((ui.available_height() / 2.0 - 40.0).max(0.0));
                        ui.add(egui::Spinner::new().size(32.0).color(theme::ACCENT));
                        ui.add_space(theme::SPACING_MD);
                        ui.label(egui::RichText::new("Loading images…").size(theme::FONT_BODY).color(theme::TEXT_MUTED));
                    });
                }
                DisplayState::Error(message) => {
                    status_message(ui, egui_phosphor::regular::WARNING_CIRCLE, &message, theme::STATUS_ERROR);
                }
                DisplayState::Empty => {
                    status_message(ui, egui_phosphor::regular::MAGNIFYING_GLASS, EMPTY_MESSAGE, theme::TEXT_MUTED);
                }
                DisplayState::Populated(entries) => self.render_grid(ui, ctx, &entries),
            });
    }

    fn render_grid(&mut self, ui: &mut egui::Ui, ctx: &egui::Context, entries: &[Entry]) {
        let spacing = theme::SPACING_MD;
        let mut clicked: Option<&Entry> = None;

        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .id_salt("grid_scroll")
            .show(ui, |ui| {
                // Inner width, excluding the scroll bar
                let cols = theme::GRID_COLUMNS as f32;
                let card_w = ((ui.available_width() - spacing * (cols - 1.0)) / cols).floor();
                let image_h = (card_w * theme::CARD_IMAGE_ASPECT).floor();
                let card_h = image_h + theme::CARD_TEXT_HEIGHT;

                ui.spacing_mut().item_spacing = egui::vec2(spacing, spacing);
                for row in entries.chunks(theme::GRID_COLUMNS) {
                    ui.horizontal(|ui| {
                        for entry in row {
                            let (rect, response) =
                                ui.allocate_exact_size(egui::vec2(card_w, card_h), egui::Sense::click());
                            if ui.is_rect_visible(rect) {
                                self.paint_card(ui, rect, image_h, entry, response.hovered());
                            }
                            if response.hovered() {
                                ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                            }
                            if response.clicked() {
                                clicked = Some(entry);
                            }
                        }
                    });
                }
            });

        if let Some(entry) = clicked {
            if !self.overlay.is_open() {
                self.request_image(entry, ctx);
                self.overlay.open(entry.clone());
            }
        }
    }

    fn paint_card(&self, ui: &egui::Ui, rect: egui::Rect, image_h: f32, entry: &Entry, hovered: bool) {
        let painter = ui.painter().with_clip_rect(rect);
        let fill = if hovered { theme::BG_HOVER } else { theme::BG_ELEVATED };
        painter.rect_filled(rect, theme::RADIUS_LARGE, fill);

        let image_rect = egui::Rect::from_min_size(rect.min, egui::vec2(rect.width(), image_h));
        let url = entry.image_url().unwrap_or_default();
        if let Some(loaded) = self.images.get(url) {
            let uv = cover_uv(loaded.thumb.size_vec2(), image_rect.size());
            painter.image(loaded.thumb.id(), image_rect, uv, egui::Color32::WHITE);
        } else if self.failed_images.contains(url) {
            painter.rect_filled(image_rect, 0.0, theme::BG_SURFACE);
            painter.text(
                image_rect.center(),
                egui::Align2::CENTER_CENTER,
                egui_phosphor::regular::IMAGE_BROKEN,
                egui::FontId::proportional(28.0),
                theme::TEXT_DIM,
            );
        } else {
            painter.rect_filled(image_rect, 0.0, theme::BG_SURFACE);
            let spinner_rect = egui::Rect::from_center_size(image_rect.center(), egui::vec2(24.0, 24.0));
            egui::Spinner::new().color(theme::ACCENT).paint_at(ui, spinner_rect);
        }

        let text_rect = egui::Rect::from_min_max(
            egui::pos2(rect.left(), image_rect.bottom()),
            rect.max,
        )
        .shrink(theme::SPACING_MD);
        let wrap_w = text_rect.width();

        let title = painter.layout(
            truncate_caption(entry.title_or_untitled(), TITLE_CHARS),
            egui::FontId::proportional(theme::FONT_LABEL),
            theme::TEXT_PRIMARY,
            wrap_w,
        );
        let mut y = text_rect.top();
        let title_h = title.size().y;
        painter.galley(egui::pos2(text_rect.left(), y), title, theme::TEXT_PRIMARY);
        y += title_h + 2.0;

        let date = entry.date.as_deref().unwrap_or_default();
        painter.text(
            egui::pos2(text_rect.left(), y),
            egui::Align2::LEFT_TOP,
            date,
            egui::FontId::proportional(theme::FONT_CAPTION),
            theme::ACCENT_LIGHT,
        );
        y += theme::FONT_CAPTION + theme::SPACING_SM;

        let caption = painter.layout(
            truncate_caption(entry.explanation.as_deref().unwrap_or_default(), CAPTION_CHARS),
            egui::FontId::proportional(theme::FONT_SMALL),
            theme::TEXT_MUTED,
            wrap_w,
        );
        painter.galley(egui::pos2(text_rect.left(), y), caption, theme::TEXT_MUTED);

        painter.rect_stroke(
            rect,
            theme::RADIUS_LARGE,
            egui::Stroke::new(theme::STROKE_DEFAULT, if hovered { theme::BORDER_DEFAULT } else { theme::BORDER_SUBTLE }),
            egui::StrokeKind::Inside,
        );
    }
}

/// Centered icon + one line of text for the non-grid states
fn status_message(ui: &mut egui::Ui, icon: &str, text: &str, color: egui::Color32) {
    ui.vertical_centered(|ui| {
        ui.add_space((ui.available_height() / 2.0 - 40.0).max(0.0));
        ui.label(egui::RichText::new(icon).size(32.0).color(color));
        ui.add_space(theme::SPACING_MD);
        ui.add(egui::Label::new(egui::RichText::new(text).size(theme::FONT_BODY).color(color)).wrap());
    });
}
