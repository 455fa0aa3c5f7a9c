use super::StudioApp;
use crate::config::AppConfig;
use crate::image::{ImageMeta, human_readable_bytes};
use crate::studio::SourceImage;
use arboard::{Clipboard, Error as ClipboardError};
use egui::Context;
use image::RgbaImage;

struct ValidatedClipboardSize {
    width: u32,
    height: u32,
    expected_len: usize,
}

impl StudioApp {
    pub(crate) fn paste_image_from_clipboard(&mut self, ctx: &Context) {
        self.image.pending = None;
        match capture_clipboard_image(&self.config) {
            Ok(source) => self.set_source(ctx, source),
            Err(err) => {
                tracing::info!(%err, "clipboard paste failed");
                self.set_status(err);
            }
        }
    }

    /// Put the caption and ad text on the clipboard.
    pub(crate) fn copy_text_to_clipboard(&mut self) {
        let Some(text) = self
            .session
            .output()
            .map(|out| out.copy.to_clipboard_text())
        else {
            self.set_status("Generate variants before copying text.");
            return;
        };
        let result = Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
        match result {
            Ok(()) => self.set_status("Caption and ad text copied."),
            Err(err) => self.set_status(format_clipboard_error("Copy", err)),
        }
    }
}

fn capture_clipboard_image(cfg: &AppConfig) -> Result<SourceImage, String> {
    let mut clipboard = Clipboard::new().map_err(|err| format_clipboard_error("Paste", err))?;
    let data = clipboard
        .get_image()
        .map_err(|err| format_clipboard_error("Paste", err))?;
    let size = validate_clipboard_image(cfg, data.width, data.height)?;
    source_from_rgba(&size, data.bytes.into_owned())
}

fn source_from_rgba(
    size: &ValidatedClipboardSize,
    mut bytes: Vec<u8>,
) -> Result<SourceImage, String> {
    if bytes.len() < size.expected_len {
        return Err("Paste failed: clipboard image data is truncated.".to_string());
    }
    bytes.truncate(size.expected_len);
    let checksum = crc32fast::hash(&bytes);
    let pixels = RgbaImage::from_raw(size.width, size.height, bytes)
        .ok_or_else(|| "Paste failed: clipboard image has an unexpected layout.".to_string())?;
    let meta = ImageMeta::from_clipboard(u64::try_from(size.expected_len).ok());
    Ok(SourceImage::from_pixels(pixels, meta, checksum))
}

fn validate_clipboard_image(
    cfg: &AppConfig,
    width: usize,
    height: usize,
) -> Result<ValidatedClipboardSize, String> {
    if width == 0 || height == 0 {
        return Err("Paste failed: clipboard image is empty.".to_string());
    }
    let limits = cfg.effective_image_limits();
    let width_u32 = u32::try_from(width).unwrap_or(u32::MAX);
    let height_u32 = u32::try_from(height).unwrap_or(u32::MAX);
    if width_u32 > limits.image_dim || height_u32 > limits.image_dim {
        return Err(format!(
            "Paste failed: clipboard image {width}x{height} exceeds the per-side limit ({} px).",
            limits.image_dim
        ));
    }

    let total_pixels = u64::from(width_u32) * u64::from(height_u32);
    if total_pixels > limits.total_pixels {
        return Err(format!(
            "Paste failed: clipboard image too large: {width}x{height} (~{} MP) exceeds limit (~{} MP).",
            total_pixels / 1_000_000,
            limits.total_pixels / 1_000_000
        ));
    }

    let rgba_bytes = total_pixels.checked_mul(4).ok_or_else(|| {
        "Paste failed: clipboard image is too large to fit in memory.".to_string()
    })?;
    if rgba_bytes > limits.alloc_bytes {
        return Err(format!(
            "Paste failed: clipboard image needs about {} of RGBA data, over the configured limit ({}).",
            human_readable_bytes(rgba_bytes),
            human_readable_bytes(limits.alloc_bytes)
        ));
    }

    let expected_len = usize::try_from(rgba_bytes).map_err(|_| {
        "Paste failed: clipboard image does not fit in available memory.".to_string()
    })?;

    Ok(ValidatedClipboardSize {
        width: width_u32,
        height: height_u32,
        expected_len,
    })
}

fn format_clipboard_error(action: &str, err: ClipboardError) -> String {
    match err {
        ClipboardError::ContentNotAvailable => {
            format!("{action} failed: clipboard does not contain an image.")
        }
        ClipboardError::ClipboardNotSupported => {
            format!("{action} failed: clipboard access is not supported in this environment.")
        }
        ClipboardError::ClipboardOccupied => {
            format!("{action} failed: clipboard is busy; try again in a moment.")
        }
        ClipboardError::ConversionFailure => {
            format!("{action} failed: clipboard contents could not be converted.")
        }
        ClipboardError::Unknown { description } => format!("{action} failed: {description}"),
        _ => format!("{action} failed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_clipboard_image_is_rejected() {
        let cfg = AppConfig::default();
        assert!(validate_clipboard_image(&cfg, 0, 10).is_err());
    }

    #[test]
    fn oversized_side_is_rejected() {
        let cfg = AppConfig::default();
        let limit = cfg.effective_image_limits().image_dim as usize;
        let err = validate_clipboard_image(&cfg, limit + 1, 10)
            .err()
            .expect("too wide");
        assert!(err.contains("per-side limit"));
    }

    #[test]
    fn expected_len_is_rgba() {
        let cfg = AppConfig::default();
        let size = validate_clipboard_image(&cfg, 30, 20).expect("fits");
        assert_eq!((size.width, size.height, size.expected_len), (30, 20, 2400));
    }

    #[test]
    fn rgba_source_checksums_the_trimmed_pixels() {
        let cfg = AppConfig::default();
        let size = validate_clipboard_image(&cfg, 2, 1).expect("fits");
        let mut bytes = vec![1, 2, 3, 255, 4, 5, 6, 255];
        bytes.extend_from_slice(&[9, 9]);
        let source = source_from_rgba(&size, bytes).expect("source");
        assert_eq!(source.pixels.dimensions(), (2, 1));
        assert_eq!(source.pixels.get_pixel(1, 0).0, [4, 5, 6, 255]);
        assert_eq!(
            source.checksum,
            crc32fast::hash(&[1, 2, 3, 255, 4, 5, 6, 255])
        );
    }

    #[test]
    fn short_rgba_buffer_is_rejected() {
        let cfg = AppConfig::default();
        let size = validate_clipboard_image(&cfg, 2, 2).expect("fits");
        let err = source_from_rgba(&size, vec![0; 15]).err().expect("truncated");
        assert!(err.contains("truncated"));
    }
}
