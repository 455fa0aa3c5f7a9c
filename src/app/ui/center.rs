use super::super::StudioApp;
use super::icons;
use egui::{Align2, Color32, RichText, Sense};

const GRID_SPACING: f32 = 10.0;
const CARD_FOOTER: f32 = 56.0;

impl StudioApp {
    pub(crate) fn ui_central(&mut self, ui: &mut egui::Ui) {
        self.handle_dropped_files(ui);

        if self.image.preview.is_none() {
            self.ui_empty_state(ui);
            return;
        }

        let available = ui.available_size();
        ui.horizontal_top(|ui| {
            let source_width = (available.x * 0.3).clamp(160.0, 360.0);
            ui.vertical(|ui| {
                ui.set_width(source_width);
                ui.label(RichText::new("Source").strong());
                if let Some(preview) = self.image.preview.as_ref() {
                    let size = preview.fit_within(egui::vec2(source_width, available.y - 40.0));
                    ui.add(egui::Image::new((preview.texture.id(), size)));
                }
            });
            ui.separator();
            ui.vertical(|ui| self.ui_variant_grid(ui));
        });
    }

    fn ui_empty_state(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click());
        let painter = ui.painter_at(rect);
        let stroke_color = if response.hovered() {
            ui.visuals().strong_text_color()
        } else {
            ui.visuals().weak_text_color()
        };
        painter.rect_stroke(
            rect.shrink(24.0),
            egui::CornerRadius::same(8),
            egui::Stroke::new(1.5, stroke_color),
            egui::StrokeKind::Inside,
        );
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "Drop a product photo here, paste it (Ctrl+V) or click to browse",
            egui::FontId::proportional(16.0),
            stroke_color,
        );
        if response.clicked() {
            self.open_image_dialog();
        }
    }

    fn ui_variant_grid(&mut self, ui: &mut egui::Ui) {
        if self.variants.is_empty() {
            let hint = if self.is_generating() {
                "Rendering variants…"
            } else {
                "Choose options and press Generate."
            };
            ui.label(RichText::new(hint).weak());
            return;
        }

        let card_w = ((ui.available_width() - GRID_SPACING) / 2.0).max(80.0);
        let card_h = ((ui.available_height() - GRID_SPACING) / 2.0 - CARD_FOOTER).max(80.0);
        let mut save_clicked = None;
        let mut upscale_clicked = None;

        egui::ScrollArea::vertical().show(ui, |ui| {
            egui::Grid::new("variants")
                .num_columns(2)
                .spacing([GRID_SPACING, GRID_SPACING])
                .show(ui, |ui| {
                    for (slot, preview) in self.variants.iter().enumerate() {
                        let variant = self
                            .session
                            .output()
                            .and_then(|out| out.variants.get(slot));
                        ui.vertical(|ui| {
                            let size = preview.fit_within(egui::vec2(card_w, card_h));
                            ui.add(egui::Image::new((preview.texture.id(), size)));
                            if let Some(variant) = variant {
                                let (w, h) = variant.image.dimensions();
                                ui.label(
                                    RichText::new(format!(
                                        "{}. {} · {w}×{h}",
                                        slot + 1,
                                        variant.preset.name
                                    ))
                                    .small()
                                    .color(Color32::from_gray(160)),
                                );
                            }
                            ui.horizontal(|ui| {
                                if ui.button(format!("{} Save PNG", icons::ICON_SAVE)).clicked() {
                                    save_clicked = Some(slot);
                                }
                                if ui
                                    .button(format!("{} Upscale 2×", icons::ICON_UPSCALE))
                                    .on_hover_text("Double the width and height of this variant")
                                    .clicked()
                                {
                                    upscale_clicked = Some(slot);
                                }
                            });
                        });
                        if slot % 2 == 1 {
                            ui.end_row();
                        }
                    }
                });
        });

        if let Some(slot) = save_clicked {
            self.save_variant_dialog(slot);
        }
        if let Some(slot) = upscale_clicked {
            self.upscale_variant(ui.ctx(), slot);
        }
    }

    fn handle_dropped_files(&mut self, ui: &egui::Ui) {
        let dropped_files = ui.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped_files.first() else {
            return;
        };
        if dropped_files.len() > 1 {
            tracing::debug!(count = dropped_files.len(), "several files dropped, using the first");
        }
        let mime = (!file.mime.is_empty()).then(|| file.mime.clone());
        if let Some(bytes) = &file.bytes {
            self.start_loading_image_from_bytes(
                (!file.name.is_empty()).then(|| file.name.clone()),
                mime,
                bytes.to_vec(),
                file.last_modified,
            );
        } else if let Some(path) = &file.path {
            if let Some(mime) = mime.as_deref()
                && let Err(err) = crate::image::ensure_image_upload(
                    &path.to_string_lossy(),
                    Some(mime),
                    &[],
                )
            {
                self.set_status(err.to_string());
                return;
            }
            self.start_loading_image_from_path(path.clone());
        } else {
            self.set_status("Drop failed: no readable bytes/path");
        }
    }
}
