use super::StudioApp;
use super::export_state::{ExportResult, PendingExport};
use crate::export::{self, ExportOutcome};
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;

impl StudioApp {
    pub(crate) fn start_export_png(&mut self, index: usize, path: PathBuf) {
        Self::remember_dir(&mut self.export.last_export_dir, &path);
        let Some(variant) = self
            .session
            .output()
            .and_then(|out| out.variants.get(index))
            .cloned()
        else {
            self.set_status("That variant is no longer available.");
            return;
        };
        self.spawn_export(move || {
            export::export_png(&path, &variant)
                .map(|()| format!("Saved {}.", path.display()))
                .map_err(|err| format!("PNG export failed: {err:#}"))
        });
    }

    pub(crate) fn start_export_zip(&mut self, path: PathBuf) {
        Self::remember_dir(&mut self.export.last_export_dir, &path);
        let Some(output) = self.session.output().cloned() else {
            self.set_status("Generate variants before exporting.");
            return;
        };
        let stem = self.export_stem();
        self.spawn_export(move || match export::export_all(&path, &output, &stem) {
            Ok(ExportOutcome::Zipped(path)) => Ok(format!("Saved {}.", path.display())),
            Ok(ExportOutcome::FellBack { files, zip_error }) => Ok(format!(
                "ZIP failed ({zip_error}); saved {} images individually.",
                files.len()
            )),
            Err(err) => Err(err.to_string()),
        });
    }

    fn spawn_export<F>(&mut self, work: F)
    where
        F: FnOnce() -> ExportResult + Send + 'static,
    {
        if self.export.pending.is_some() {
            self.set_status("An export is already in progress.");
            return;
        }
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(work());
        });
        self.export.pending = Some(PendingExport { rx });
        self.set_status("Exporting…");
    }

    pub(crate) fn poll_export_job(&mut self) {
        let Some(job) = self.export.pending.take() else {
            return;
        };
        match job.rx.try_recv() {
            Ok(Ok(msg) | Err(msg)) => self.set_status(msg),
            Err(TryRecvError::Empty) => self.export.pending = Some(job),
            Err(TryRecvError::Disconnected) => {
                self.set_status("Export failed: worker disconnected.");
            }
        }
    }
}
