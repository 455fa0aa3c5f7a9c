use crate::config::{AppConfig, ImageLimits};
use crate::studio::StudioError;
use anyhow::Context as _;
use image::{ImageFormat, ImageReader, Limits, RgbaImage};
use std::io::{BufRead, Cursor, Read, Seek};
use std::path::Path;

fn decode_reader<R>(limits: &ImageLimits, mut reader: ImageReader<R>) -> anyhow::Result<RgbaImage>
where
    R: Read + Seek + BufRead,
{
    let mut decode_limits = Limits::default();
    decode_limits.max_image_width = Some(limits.image_dim);
    decode_limits.max_image_height = Some(limits.image_dim);
    decode_limits.max_alloc = Some(limits.alloc_bytes);
    reader.limits(decode_limits);
    let img = reader.decode().context("Failed to decode image data")?;

    let (w, h) = (img.width(), img.height());
    let total_pixels = u64::from(w) * u64::from(h);
    if total_pixels > limits.total_pixels {
        anyhow::bail!(
            "Image too large: {}x{} (~{} MP) exceeds limit (~{} MP)",
            w,
            h,
            total_pixels / 1_000_000,
            limits.total_pixels / 1_000_000
        );
    }
    Ok(img.to_rgba8())
}

/// Load and decode an image from raw bytes using configured limits.
pub fn decode_image_from_bytes(cfg: &AppConfig, bytes: &[u8]) -> anyhow::Result<RgbaImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .context("Failed to detect image format")?;
    decode_reader(&cfg.effective_image_limits(), reader)
}

/// Upload gate: accept `image/*` MIME types, or a recognizable image when no MIME is known.
pub fn ensure_image_upload(
    name: &str,
    mime: Option<&str>,
    leading_bytes: &[u8],
) -> Result<(), StudioError> {
    let accepted = match mime.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) => mime
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/")),
        None => {
            image::guess_format(leading_bytes).is_ok()
                || Path::new(name)
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(ImageFormat::from_extension)
                    .is_some()
        }
    };
    if accepted {
        Ok(())
    } else {
        tracing::info!(name, ?mime, "rejected non-image upload");
        Err(StudioError::NotAnImage(display_upload_name(name)))
    }
}

/// Validate then decode an upload, mapping failures to user-facing errors.
pub fn decode_upload(
    cfg: &AppConfig,
    name: &str,
    mime: Option<&str>,
    bytes: &[u8],
) -> Result<RgbaImage, StudioError> {
    ensure_image_upload(name, mime, bytes)?;
    decode_image_from_bytes(cfg, bytes).map_err(|err| StudioError::Decode(format!("{err:#}")))
}

fn display_upload_name(name: &str) -> String {
    if name.trim().is_empty() {
        "The dropped file".to_string()
    } else {
        format!("'{name}'")
    }
}
