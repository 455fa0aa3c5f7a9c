use super::StudioApp;
use super::image_state::{ImageLoadRequest, PendingImageMeta, PendingImageTask};
use crate::config::AppConfig;
use crate::image::{Preview, decode_upload};
use crate::studio::{SourceImage, StudioError};
use anyhow::Context as _;
use egui::Context;
use std::path::PathBuf;
use std::sync::mpsc::{self, TryRecvError};
use std::thread;

impl StudioApp {
    pub(crate) fn start_loading_image_from_path(&mut self, path: PathBuf) {
        Self::remember_dir(&mut self.image.last_image_dir, &path);
        let meta = PendingImageMeta::Path { path: path.clone() };
        self.start_image_load(ImageLoadRequest::Path(path), meta);
    }

    pub(crate) fn start_loading_image_from_bytes(
        &mut self,
        name: Option<String>,
        mime: Option<String>,
        bytes: Vec<u8>,
        last_modified: Option<std::time::SystemTime>,
    ) {
        let meta = PendingImageMeta::DroppedBytes {
            name,
            byte_len: bytes.len(),
            last_modified,
        };
        self.start_image_load(ImageLoadRequest::Bytes { bytes, mime }, meta);
    }

    fn start_image_load(&mut self, request: ImageLoadRequest, meta: PendingImageMeta) {
        let description = meta.description();
        let cfg = self.config.clone();
        let worker_meta = meta.clone();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(load_source(&cfg, request, worker_meta));
        });
        // A newer request replaces the pending one; its result is dropped.
        self.image.pending = Some(PendingImageTask { rx, meta });
        self.set_status(format!("Loading {description}…"));
    }

    pub(crate) fn poll_image_loader(&mut self, ctx: &Context) {
        let Some(task) = self.image.pending.take() else {
            return;
        };
        match task.rx.try_recv() {
            Ok(Ok(source)) => self.set_source(ctx, source),
            Ok(Err(err)) => {
                let label = task.meta.description();
                tracing::warn!(%label, %err, "image load failed");
                self.set_status(err.to_string());
            }
            Err(TryRecvError::Empty) => {
                self.image.pending = Some(task);
                ctx.request_repaint();
            }
            Err(TryRecvError::Disconnected) => {
                let label = task.meta.description();
                self.set_status(format!("Loading {label} failed: worker disconnected."));
            }
        }
    }

    /// Install a decoded upload. Previous variants and any running generation are dropped.
    pub(crate) fn set_source(&mut self, ctx: &Context, source: SourceImage) {
        let name = source.meta.display_name();
        let (w, h) = source.pixels.dimensions();
        self.image.preview = Some(Preview::from_rgba(ctx, "source", &source.pixels));
        self.variants.clear();
        self.generation = None;
        self.session.set_source(source);
        tracing::info!(%name, w, h, "source image loaded");
        self.set_status(format!("Loaded {name} ({w}×{h})."));
    }
}

fn load_source(
    cfg: &AppConfig,
    request: ImageLoadRequest,
    meta: PendingImageMeta,
) -> Result<SourceImage, StudioError> {
    let name = meta.upload_name();
    let (bytes, mime) = match request {
        ImageLoadRequest::Path(path) => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))
                .map_err(|err| StudioError::Decode(format!("{err:#}")))?;
            (bytes, None)
        }
        ImageLoadRequest::Bytes { bytes, mime } => (bytes, mime),
    };
    let pixels = decode_upload(cfg, &name, mime.as_deref(), &bytes)?;
    Ok(SourceImage::new(pixels, meta.into_image_meta(), &bytes))
}
