use std::path::PathBuf;
use std::sync::mpsc::Receiver;

/// Status line reported by a finished export worker.
pub type ExportResult = Result<String, String>;

pub struct PendingExport {
    pub(super) rx: Receiver<ExportResult>,
}

#[derive(Default)]
pub struct ExportState {
    pub(super) pending: Option<PendingExport>,
    pub(super) last_export_dir: Option<PathBuf>,
}
