use egui_file_dialog::FileDialog;

pub struct UiState {
    pub(super) side_open: bool,
    pub(super) info_window_open: bool,
    pub(super) active_dialog: Option<NativeDialog>,
    pub(super) last_status: Option<String>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            side_open: true,
            info_window_open: false,
            active_dialog: None,
            last_status: None,
        }
    }
}

#[derive(Debug)]
pub enum NativeDialog {
    Open(FileDialog),
    SavePng { dialog: FileDialog, index: usize },
    SaveZip(FileDialog),
}
