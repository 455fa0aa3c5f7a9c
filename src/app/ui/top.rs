use super::super::StudioApp;
use super::icons;

impl StudioApp {
    pub(crate) fn ui_top(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            // Use egui's built-in theme toggle so icon matches current mode.
            egui::widgets::global_theme_preference_switch(ui);
            ui.separator();

            self.ui_file_menu(ui);
            ui.separator();

            let side_label = if self.ui.side_open {
                "Hide options"
            } else {
                "Show options"
            };
            if ui
                .add(
                    egui::Button::new(format!("{} {side_label}", icons::ICON_SIDE_TOGGLE))
                        .shortcut_text("Ctrl+B"),
                )
                .clicked()
            {
                self.ui.side_open = !self.ui.side_open;
            }

            let has_source = self.session.source().is_some();
            if ui
                .add_enabled(
                    has_source,
                    egui::Button::new(format!("{} Image info", icons::ICON_INFO)),
                )
                .on_hover_text("Show details of the uploaded photo (Ctrl+I)")
                .clicked()
            {
                self.ui.info_window_open = true;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let usage = self.session.usage();
                ui.label(format!(
                    "{} of {} generations left today",
                    usage.remaining(),
                    usage.daily_limit()
                ));
            });
        });
    }

    fn ui_file_menu(&mut self, ui: &mut egui::Ui) {
        let has_output = self.session.output().is_some();
        ui.menu_button(format!("{} File", icons::ICON_MENU), |ui| {
            if ui
                .add(egui::Button::new("Open image…").shortcut_text("Ctrl+O"))
                .on_hover_text("Open a product photo (Ctrl+O). You can also drag & drop into the window.")
                .clicked()
            {
                self.open_image_dialog();
                ui.close();
            }

            if ui
                .add(egui::Button::new("Paste image").shortcut_text("Ctrl+V"))
                .on_hover_text("Paste image from clipboard (Ctrl+V)")
                .clicked()
            {
                self.paste_image_from_clipboard(ui.ctx());
                ui.close();
            }

            ui.separator();

            if ui
                .add_enabled(
                    has_output,
                    egui::Button::new(format!("{} Save all as ZIP…", icons::ICON_SAVE))
                        .shortcut_text("Ctrl+Shift+S"),
                )
                .on_hover_text("Bundle every variant, the copy text and a preview sheet")
                .clicked()
            {
                self.save_zip_dialog();
                ui.close();
            }

            if ui
                .add_enabled(
                    has_output,
                    egui::Button::new(format!("{} Copy caption & ad text", icons::ICON_COPY))
                        .shortcut_text("Ctrl+Shift+C"),
                )
                .clicked()
            {
                self.copy_text_to_clipboard();
                ui.close();
            }
        });
    }
}
