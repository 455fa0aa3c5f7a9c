use super::super::{NativeDialog, StudioApp};
use crate::export::default_bundle_name;
use egui_file_dialog::FileDialog;
use std::path::Path;

impl StudioApp {
    pub(crate) fn open_image_dialog(&mut self) {
        let mut dialog = Self::make_open_dialog(self.image.last_image_dir.as_deref());
        dialog.pick_file();
        self.ui.active_dialog = Some(NativeDialog::Open(dialog));
    }

    pub(crate) fn save_variant_dialog(&mut self, index: usize) {
        let stem = self.export_stem();
        let Some(default_name) = self
            .session
            .output()
            .and_then(|out| out.variants.get(index))
            .map(|variant| variant.file_name(&stem))
        else {
            self.set_status("Generate variants before saving.");
            return;
        };
        let mut dialog = Self::make_save_dialog(
            "Save variant",
            &default_name,
            &["png"],
            self.export.last_export_dir.as_deref(),
        );
        dialog.save_file();
        self.ui.active_dialog = Some(NativeDialog::SavePng { dialog, index });
    }

    pub(crate) fn save_zip_dialog(&mut self) {
        if self.session.output().is_none() {
            self.set_status("Generate variants before exporting.");
            return;
        }
        let checksum = self.session.source().map_or(0, |src| src.checksum);
        let default_name = default_bundle_name(&self.config.export.zip_stem, checksum);
        let mut dialog = Self::make_save_dialog(
            "Save all variants",
            &default_name,
            &["zip"],
            self.export.last_export_dir.as_deref(),
        );
        dialog.save_file();
        self.ui.active_dialog = Some(NativeDialog::SaveZip(dialog));
    }

    pub(crate) fn make_open_dialog(initial_dir: Option<&Path>) -> FileDialog {
        // Keep in sync with enabled `image` crate features.
        let mut dialog = FileDialog::new()
            .title("Open product photo")
            .add_file_filter_extensions(
                "All images",
                vec![
                    "png", "jpg", "jpeg", "gif", "bmp", "webp", "ico", "tga", "tiff", "tif", "pnm",
                    "pbm", "pgm", "ppm", "hdr", "dds",
                ],
            )
            .add_file_filter_extensions("PNG", vec!["png"])
            .add_file_filter_extensions("JPEG/JPG", vec!["jpg", "jpeg"])
            .add_file_filter_extensions("WebP", vec!["webp"])
            .default_file_filter("All images");
        if let Some(dir) = initial_dir {
            dialog = dialog.initial_directory(dir.to_path_buf());
        }
        dialog
    }

    pub(crate) fn make_save_dialog(
        title: &str,
        default_name: &str,
        extensions: &[&str],
        initial_dir: Option<&Path>,
    ) -> FileDialog {
        let mut dialog = FileDialog::new()
            .title(title)
            .default_file_name(default_name);
        let mut first_label: Option<String> = None;
        for ext in extensions {
            let label = format!("*.{ext}");
            if first_label.is_none() {
                first_label = Some(label.clone());
            }
            dialog = dialog.add_save_extension(&label, ext);
        }
        if let Some(label) = first_label.as_deref() {
            dialog = dialog.default_save_extension(label);
        }
        if let Some(dir) = initial_dir {
            dialog = dialog.initial_directory(dir.to_path_buf());
        }
        dialog
    }
}
