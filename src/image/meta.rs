use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Where an uploaded product photo came from.
#[derive(Debug, Clone)]
pub enum UploadOrigin {
    File(PathBuf),
    Dropped { name: Option<String> },
    Clipboard,
}

/// Provenance and size details for the current upload.
#[derive(Debug, Clone)]
pub struct ImageMeta {
    origin: UploadOrigin,
    byte_len: Option<u64>,
    last_modified: Option<SystemTime>,
}

impl ImageMeta {
    pub fn from_path(path: &Path) -> Self {
        let fs_meta = std::fs::metadata(path).ok();
        Self {
            origin: UploadOrigin::File(path.to_owned()),
            byte_len: fs_meta.as_ref().map(std::fs::Metadata::len),
            last_modified: fs_meta.and_then(|m| m.modified().ok()),
        }
    }

    pub fn from_dropped_bytes(
        name: Option<&str>,
        byte_len: usize,
        last_modified: Option<SystemTime>,
    ) -> Self {
        Self {
            origin: UploadOrigin::Dropped {
                name: name.filter(|s| !s.is_empty()).map(ToOwned::to_owned),
            },
            byte_len: u64::try_from(byte_len).ok(),
            last_modified,
        }
    }

    pub const fn from_clipboard(byte_len: Option<u64>) -> Self {
        Self {
            origin: UploadOrigin::Clipboard,
            byte_len,
            last_modified: None,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.origin {
            UploadOrigin::File(path) => path
                .file_name()
                .and_then(|s| s.to_str())
                .map_or_else(|| path.display().to_string(), ToOwned::to_owned),
            UploadOrigin::Dropped { name } => name
                .clone()
                .unwrap_or_else(|| "Dropped image".to_string()),
            UploadOrigin::Clipboard => "Clipboard image".to_string(),
        }
    }

    /// File stem used to suggest export names (`product` for `product.jpg`).
    pub fn stem(&self) -> Option<String> {
        let name = match &self.origin {
            UploadOrigin::File(path) => path.file_stem()?.to_str()?.to_owned(),
            UploadOrigin::Dropped { name } => {
                let name = name.as_deref()?;
                Path::new(name).file_stem()?.to_str()?.to_owned()
            }
            UploadOrigin::Clipboard => return None,
        };
        (!name.is_empty()).then_some(name)
    }

    pub const fn source_label(&self) -> &'static str {
        match self.origin {
            UploadOrigin::File(_) => "File on disk",
            UploadOrigin::Dropped { .. } => "Dropped file",
            UploadOrigin::Clipboard => "Clipboard",
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match &self.origin {
            UploadOrigin::File(path) => Some(path),
            UploadOrigin::Dropped { .. } | UploadOrigin::Clipboard => None,
        }
    }

    pub const fn byte_len(&self) -> Option<u64> {
        self.byte_len
    }

    pub const fn last_modified(&self) -> Option<SystemTime> {
        self.last_modified
    }
}

/// Format a byte count with binary units (KiB, MiB, ...).
pub fn human_readable_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

pub fn format_system_time(time: SystemTime) -> String {
    let datetime: DateTime<Local> = DateTime::from(time);
    datetime.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Reduced aspect ratio such as `4:3`.
pub fn describe_aspect_ratio(width: u32, height: u32) -> Option<String> {
    if width == 0 || height == 0 {
        return None;
    }
    let divisor = gcd(width, height);
    Some(format!("{}:{}", width / divisor, height / divisor))
}

const fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let tmp = a % b;
        a = b;
        b = tmp;
    }
    if a == 0 { 1 } else { a }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_use_binary_units() {
        assert_eq!(human_readable_bytes(512), "512 B");
        assert_eq!(human_readable_bytes(1536), "1.50 KiB");
        assert_eq!(human_readable_bytes(5 * 1024 * 1024), "5.00 MiB");
    }

    #[test]
    fn aspect_ratio_is_reduced() {
        assert_eq!(describe_aspect_ratio(1920, 1080).as_deref(), Some("16:9"));
        assert_eq!(describe_aspect_ratio(768, 1024).as_deref(), Some("3:4"));
        assert_eq!(describe_aspect_ratio(0, 10), None);
    }

    #[test]
    fn stem_comes_from_file_or_dropped_name() {
        let meta = ImageMeta::from_dropped_bytes(Some("mug-front.jpg"), 10, None);
        assert_eq!(meta.stem().as_deref(), Some("mug-front"));
        assert_eq!(meta.display_name(), "mug-front.jpg");
        assert_eq!(ImageMeta::from_clipboard(None).stem(), None);
        assert_eq!(
            ImageMeta::from_dropped_bytes(Some(""), 10, None).display_name(),
            "Dropped image"
        );
    }
}
