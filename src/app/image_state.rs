use crate::image::{ImageMeta, Preview};
use crate::studio::{SourceImage, StudioError};
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::time::SystemTime;

pub enum ImageLoadRequest {
    Path(PathBuf),
    Bytes {
        bytes: Vec<u8>,
        mime: Option<String>,
    },
}

pub struct PendingImageTask {
    pub(super) rx: Receiver<Result<SourceImage, StudioError>>,
    pub(super) meta: PendingImageMeta,
}

#[derive(Clone)]
pub enum PendingImageMeta {
    Path {
        path: PathBuf,
    },
    DroppedBytes {
        name: Option<String>,
        byte_len: usize,
        last_modified: Option<SystemTime>,
    },
}

impl PendingImageMeta {
    pub(super) fn description(&self) -> String {
        match self {
            Self::Path { path } => path
                .file_name()
                .and_then(|s| s.to_str())
                .map_or_else(|| path.display().to_string(), str::to_string),
            Self::DroppedBytes { name, .. } => name
                .as_deref()
                .map_or_else(|| "dropped file".to_string(), str::to_string),
        }
    }

    /// Name handed to the upload gate for extension sniffing.
    pub(super) fn upload_name(&self) -> String {
        match self {
            Self::Path { path } => path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            Self::DroppedBytes { name, .. } => name.clone().unwrap_or_default(),
        }
    }

    pub(super) fn into_image_meta(self) -> ImageMeta {
        match self {
            Self::Path { path } => ImageMeta::from_path(&path),
            Self::DroppedBytes {
                name,
                byte_len,
                last_modified,
            } => ImageMeta::from_dropped_bytes(name.as_deref(), byte_len, last_modified),
        }
    }
}

#[derive(Default)]
pub struct ImageState {
    pub(super) preview: Option<Preview>,
    pub(super) pending: Option<PendingImageTask>,
    pub(super) last_image_dir: Option<PathBuf>,
}
