//! Main egui/eframe application state and UI orchestration.

use crate::config::AppConfig;
use crate::image::Preview;
use crate::studio::{Session, UsageCounter};
use chrono::Local;
use egui::{Context, Key};
use egui_file_dialog::DialogState;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod clipboard;
mod export_jobs;
mod export_state;
mod generation;
mod image_loader;
mod image_state;
mod ui;
mod ui_state;

use export_state::ExportState;
use generation::PendingGeneration;
use image_state::ImageState;
use ui_state::{NativeDialog, UiState};

/// Top-level application state for the Ad Studio UI.
pub struct StudioApp {
    session: Session,
    config: AppConfig,
    image: ImageState,
    variants: Vec<Preview>,
    generation: Option<PendingGeneration>,
    export: ExportState,
    ui: UiState,
}

impl StudioApp {
    /// Create the app, restoring today's usage count and optionally queueing an initial image.
    pub fn new(cc: &eframe::CreationContext<'_>, initial_path: Option<&Path>) -> Self {
        let config = AppConfig::load();
        let usage = UsageCounter::load(cc.storage, &config.quota, Local::now().date_naive());
        let session = Session::new(
            config.initial_options(),
            usage,
            config.watermark.clone(),
        );
        let mut app = Self {
            session,
            config,
            image: ImageState::default(),
            variants: Vec::new(),
            generation: None,
            export: ExportState::default(),
            ui: UiState::default(),
        };
        if let Some(path) = initial_path {
            app.start_loading_image_from_path(path.to_path_buf());
        }
        app
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        tracing::debug!(status = %msg);
        self.ui.last_status = Some(msg);
    }

    /// File stem used for exported variant names.
    fn export_stem(&self) -> String {
        self.session
            .source()
            .and_then(|src| src.meta.stem())
            .unwrap_or_else(|| self.config.export.zip_stem.clone())
    }

    fn handle_hotkeys(&mut self, ctx: &Context) {
        // Ignored while typing in text fields.
        if ctx.wants_keyboard_input() {
            return;
        }
        // Ctrl/Cmd + B: toggle side panel
        if ctx.input(|i| i.key_pressed(Key::B) && i.modifiers.command) {
            self.ui.side_open = !self.ui.side_open;
        }
        if self.ui.active_dialog.is_some() {
            return;
        }
        // Ctrl/Cmd + O: open image
        if ctx.input(|i| i.key_pressed(Key::O) && i.modifiers.command) {
            self.open_image_dialog();
        }
        // Ctrl/Cmd + V: paste image from clipboard
        if ctx.input(|i| i.key_pressed(Key::V) && i.modifiers.command) {
            self.paste_image_from_clipboard(ctx);
        }
        // Ctrl/Cmd + Enter: generate
        if ctx.input(|i| i.key_pressed(Key::Enter) && i.modifiers.command) {
            self.start_generation();
        }
        // Ctrl/Cmd + Shift + S: save all variants as ZIP
        if self.session.output().is_some()
            && ctx.input(|i| i.key_pressed(Key::S) && i.modifiers.command && i.modifiers.shift)
        {
            self.save_zip_dialog();
        }
        // Ctrl/Cmd + Shift + C: copy caption and ad text
        if self.session.output().is_some()
            && ctx.input(|i| i.key_pressed(Key::C) && i.modifiers.command && i.modifiers.shift)
        {
            self.copy_text_to_clipboard();
        }
        // Ctrl/Cmd + I: show image info
        if self.session.source().is_some()
            && ctx.input(|i| i.key_pressed(Key::I) && i.modifiers.command)
        {
            self.ui.info_window_open = true;
        }
    }

    fn update_dialogs(&mut self, ctx: &Context) {
        let Some(dialog_state) = self.ui.active_dialog.as_mut() else {
            return;
        };
        let (dialog, label) = match dialog_state {
            NativeDialog::Open(dialog) => (dialog, "Open"),
            NativeDialog::SavePng { dialog, .. } | NativeDialog::SaveZip(dialog) => {
                (dialog, "Export")
            }
        };
        dialog.update(ctx);
        let picked = dialog.take_picked();
        let state = dialog.state();

        let Some(path) = picked else {
            match state {
                DialogState::Cancelled => {
                    self.ui.active_dialog = None;
                    self.set_status(format!("{label} canceled."));
                }
                DialogState::Closed => self.ui.active_dialog = None,
                _ => {}
            }
            return;
        };
        let Some(finished) = self.ui.active_dialog.take() else {
            return;
        };
        match finished {
            NativeDialog::Open(_) => self.start_loading_image_from_path(path),
            NativeDialog::SavePng { index, .. } => self.start_export_png(index, path),
            NativeDialog::SaveZip(_) => self.start_export_zip(path),
        }
    }

    fn remember_dir(slot: &mut Option<PathBuf>, path: &Path) {
        *slot = Some(
            path.parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf),
        );
    }

    fn persist_usage(&mut self, storage: &mut dyn eframe::Storage) {
        let usage = self.session.usage_mut();
        if usage.has_unsaved() {
            usage.persist(storage);
            tracing::debug!(key = %usage.current_key(), "usage counter saved");
        }
    }
}

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &Context, frame: &mut eframe::Frame) {
        self.poll_image_loader(ctx);
        self.poll_generation(ctx);
        self.poll_export_job();
        if self.export.pending.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        self.session
            .roll_day(Local::now().date_naive(), frame.storage());

        // Persist the counter as soon as it changes, not only on auto-save.
        if self.session.usage().has_unsaved()
            && let Some(storage) = frame.storage_mut()
        {
            self.persist_usage(storage);
            storage.flush();
        }

        self.handle_hotkeys(ctx);

        egui::TopBottomPanel::top("top").show(ctx, |ui| self.ui_top(ui));
        egui::SidePanel::left("options")
            .resizable(true)
            .default_width(300.0)
            .show_animated(ctx, self.ui.side_open, |ui| self.ui_side_options(ui));
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| self.ui_status_bar(ui));
        egui::CentralPanel::default().show(ctx, |ui| self.ui_central(ui));
        self.ui_image_info_window(ctx);

        self.update_dialogs(ctx);
    }

    // Required by eframe 0.34; all drawing happens in `update`, which eframe still calls first.
    fn ui(&mut self, _ui: &mut egui::Ui, _frame: &mut eframe::Frame) {}

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.persist_usage(storage);
    }
}
