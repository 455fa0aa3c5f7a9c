use super::super::StudioApp;
use super::icons;
use crate::studio::{AspectRatio, Mode, Quality};
use egui::RichText;

impl StudioApp {
    pub(crate) fn ui_side_options(&mut self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical().show(ui, |ui| {
            ui.heading("Options");
            ui.add_space(4.0);
            self.ui_mode_and_text(ui);
            ui.add_space(6.0);
            self.ui_format_options(ui);
            ui.add_space(10.0);
            self.ui_generate_button(ui);
            ui.add_space(10.0);
            ui.separator();
            self.ui_copy_block(ui);
        });
    }

    fn ui_mode_and_text(&mut self, ui: &mut egui::Ui) {
        let options = &mut self.session.options;
        ui.label("Mode");
        ui.horizontal(|ui| {
            for mode in Mode::ALL {
                ui.radio_value(&mut options.mode, mode, mode.label());
            }
        });
        ui.label("Style");
        ui.add(
            egui::TextEdit::singleline(&mut options.style)
                .hint_text("e.g. minimal, vintage, bold"),
        );
        ui.label("Prompt");
        ui.add(
            egui::TextEdit::multiline(&mut options.prompt)
                .desired_rows(3)
                .hint_text("Describe the product or campaign"),
        );
    }

    fn ui_format_options(&mut self, ui: &mut egui::Ui) {
        let options = &mut self.session.options;
        egui::Grid::new("format_options")
            .num_columns(2)
            .spacing([8.0, 6.0])
            .show(ui, |ui| {
                ui.label("Aspect");
                egui::ComboBox::from_id_salt("aspect")
                    .selected_text(options.aspect.label())
                    .show_ui(ui, |ui| {
                        for aspect in AspectRatio::ALL {
                            ui.selectable_value(&mut options.aspect, aspect, aspect.label());
                        }
                    });
                ui.end_row();

                ui.label("Quality");
                egui::ComboBox::from_id_salt("quality")
                    .selected_text(options.quality.label())
                    .show_ui(ui, |ui| {
                        for quality in Quality::ALL {
                            ui.selectable_value(&mut options.quality, quality, quality.label());
                        }
                    });
                ui.end_row();

                ui.label("Watermark");
                ui.checkbox(&mut options.watermark, "");
                ui.end_row();
            });
        let (w, h) = options.canvas_size();
        ui.label(RichText::new(format!("Output size: {w} × {h} px")).weak());
    }

    fn ui_generate_button(&mut self, ui: &mut egui::Ui) {
        let generating = self.is_generating();
        let label = if generating {
            "Generating…".to_string()
        } else {
            format!("{} Generate", icons::ICON_GENERATE)
        };
        let button = egui::Button::new(RichText::new(label).strong())
            .min_size(egui::vec2(ui.available_width(), 32.0))
            .shortcut_text("Ctrl+Enter");
        if ui.add_enabled(!generating, button).clicked() {
            self.start_generation();
        }
        if generating {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Rendering four variants…");
            });
        }
        let usage = self.session.usage();
        let remaining = usage.remaining();
        let text = RichText::new(format!(
            "{remaining} / {} generations left today",
            usage.daily_limit()
        ))
        .small();
        if remaining == 0 {
            ui.label(text.color(ui.visuals().error_fg_color));
        } else {
            ui.label(text.weak());
        }
    }

    fn ui_copy_block(&mut self, ui: &mut egui::Ui) {
        ui.heading("Copy");
        let Some(output) = self.session.output() else {
            ui.label(RichText::new("Caption and ad text appear after generating.").weak());
            return;
        };
        ui.label(RichText::new("Caption").strong());
        ui.label(&output.copy.caption);
        ui.add_space(4.0);
        ui.label(RichText::new("Ad text").strong());
        ui.label(&output.copy.ad_text);
        ui.add_space(6.0);
        if ui
            .button(format!("{} Copy to clipboard", icons::ICON_COPY))
            .clicked()
        {
            self.copy_text_to_clipboard();
        }
    }
}
