use super::super::StudioApp;
use crate::image::{describe_aspect_ratio, format_system_time, human_readable_bytes};
use egui::{Color32, RichText};

impl StudioApp {
    pub(crate) fn ui_status_bar(&self, ui: &mut egui::Ui) {
        let options = &self.session.options;
        let (w, h) = options.canvas_size();
        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format!(
                    "{} · {} · {w}×{h}",
                    options.mode.label(),
                    options.aspect.key()
                ))
                .small()
                .color(Color32::from_gray(180)),
            );
            if let Some(msg) = &self.ui.last_status {
                ui.separator();
                ui.label(
                    RichText::new(msg.as_str())
                        .small()
                        .color(Color32::from_gray(200)),
                );
            }
        });
    }

    pub(crate) fn ui_image_info_window(&mut self, ctx: &egui::Context) {
        if !self.ui.info_window_open {
            return;
        }

        egui::Window::new("Image info")
            .open(&mut self.ui.info_window_open)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                let Some(source) = self.session.source() else {
                    ui.label("Upload a product photo to inspect its metadata.");
                    return;
                };
                let meta = &source.meta;
                ui.heading("File");
                ui.label(format!("Source: {}", meta.source_label()));
                ui.label(format!("Name: {}", meta.display_name()));
                if let Some(path) = meta.path() {
                    ui.label(format!("Path: {}", path.display()));
                }
                if let Some(bytes) = meta.byte_len() {
                    ui.label(format!(
                        "Size: {} ({bytes} bytes)",
                        human_readable_bytes(bytes),
                    ));
                } else {
                    ui.label("Size: Unknown");
                }
                if let Some(modified) = meta.last_modified() {
                    ui.label(format!("Modified: {}", format_system_time(modified)));
                } else {
                    ui.label("Modified: Unknown");
                }
                ui.label(format!("CRC32: {:08x}", source.checksum));

                ui.add_space(6.0);
                ui.heading("Image");
                let (w, h) = source.pixels.dimensions();
                ui.label(format!("Dimensions: {w} × {h} px"));
                if let Some(aspect_text) = describe_aspect_ratio(w, h) {
                    ui.label(format!("Aspect ratio: {aspect_text}"));
                } else {
                    ui.label("Aspect ratio: n/a");
                }
                let total_pixels = u64::from(w) * u64::from(h);
                #[allow(clippy::cast_precision_loss)]
                let megapixels = total_pixels as f64 / 1_000_000.0;
                ui.label(format!("Pixels: {total_pixels} ({megapixels:.2} MP)"));
            });
    }
}
