use std::fs;
use std::path::PathBuf;

use directories::{BaseDirs, ProjectDirs};
use serde::Deserialize;

use crate::studio::{AspectRatio, Mode, Quality, StudioOptions};

const CONFIG_FILE_NAME: &str = "adstudio.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub image_limits: ImageLimits,
    pub quota: QuotaConfig,
    pub watermark: WatermarkStyle,
    pub defaults: DefaultsConfig,
    pub export: ExportConfig,
}

impl AppConfig {
    pub fn load() -> Self {
        for path in Self::candidate_paths() {
            if let Ok(contents) = fs::read_to_string(&path) {
                match toml::from_str::<Self>(&contents) {
                    Ok(cfg) => {
                        tracing::info!(path = %path.display(), "loaded config");
                        return cfg;
                    }
                    Err(err) => {
                        tracing::warn!("Failed to parse config {}: {err}", path.display());
                    }
                }
            }
        }
        Self::default()
    }

    pub fn effective_image_limits(&self) -> ImageLimits {
        self.image_limits.sanitized()
    }

    /// Session options the app starts with, built from the `[defaults]` section.
    pub fn initial_options(&self) -> StudioOptions {
        let defaults = &self.defaults;
        let aspect = AspectRatio::from_key(&defaults.aspect).unwrap_or_else(|err| {
            tracing::warn!("{err}; falling back to {}", AspectRatio::Square.key());
            AspectRatio::Square
        });
        StudioOptions {
            mode: defaults.mode,
            style: defaults.style.clone(),
            prompt: String::new(),
            aspect,
            quality: defaults.quality,
            watermark: defaults.watermark,
        }
    }

    fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(exe_path) = std::env::current_exe()
            && let Some(dir) = exe_path.parent()
        {
            paths.push(dir.join(CONFIG_FILE_NAME));
        }

        if let Some(proj_dirs) = ProjectDirs::from("dev", "AdStudio", "AdStudio") {
            paths.push(proj_dirs.config_dir().join(CONFIG_FILE_NAME));
        }

        if let Some(base_dirs) = BaseDirs::new() {
            paths.push(base_dirs.config_dir().join("adstudio").join(CONFIG_FILE_NAME));
        }

        paths
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageLimits {
    pub image_dim: u32,
    pub total_pixels: u64,
    pub alloc_bytes: u64,
}

impl Default for ImageLimits {
    fn default() -> Self {
        Self {
            image_dim: 12_000,
            total_pixels: 80_000_000,       // ~80 MP
            alloc_bytes: 512 * 1024 * 1024, // 512 MiB
        }
    }
}

impl ImageLimits {
    pub fn sanitized(&self) -> Self {
        let dim = self.image_dim.clamp(64, 100_000);
        let pixels = self.total_pixels.clamp(1_000_000, 5_000_000_000); // 1 MP .. 5 GP
        let alloc = self
            .alloc_bytes
            .clamp(8 * 1024 * 1024, 8 * 1024 * 1024 * 1024); // 8 MiB .. 8 GiB
        Self {
            image_dim: dim,
            total_pixels: pixels,
            alloc_bytes: alloc,
        }
    }
}

/// Daily generation allowance and the storage key prefix for the counter.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub daily_limit: u32,
    pub key_prefix: String,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: 30,
            key_prefix: "adstudio_usage".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WatermarkStyle {
    pub text: String,
    pub color: [u8; 3],
    pub alpha: f32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            text: "AD STUDIO".to_string(),
            color: [20, 20, 20],
            alpha: 0.55,
        }
    }
}

impl WatermarkStyle {
    pub const fn opacity(&self) -> f32 {
        self.alpha.clamp(0.05, 1.0)
    }

    pub fn hex_color(&self) -> String {
        let [r, g, b] = self.color;
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub mode: Mode,
    pub style: String,
    pub aspect: String,
    pub quality: Quality,
    pub watermark: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Photo,
            style: "minimal".to_string(),
            aspect: AspectRatio::Square.key().to_string(),
            quality: Quality::Standard,
            watermark: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub zip_stem: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            zip_stem: "adstudio".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults_for_missing_sections() {
        let cfg: AppConfig = toml::from_str(
            r#"
            [quota]
            daily_limit = 5

            [defaults]
            mode = "poster"
            aspect = "9:16"
            quality = "ultra"
            "#,
        )
        .expect("parse config");
        assert_eq!(cfg.quota.daily_limit, 5);
        assert_eq!(cfg.quota.key_prefix, "adstudio_usage");
        assert_eq!(cfg.watermark.text, "AD STUDIO");

        let options = cfg.initial_options();
        assert_eq!(options.mode, Mode::Poster);
        assert_eq!(options.aspect, AspectRatio::Story);
        assert_eq!(options.quality, Quality::Ultra);
        assert!(options.prompt.is_empty());
    }

    #[test]
    fn unknown_default_aspect_falls_back_to_square() {
        let mut cfg = AppConfig::default();
        cfg.defaults.aspect = "21:9".to_string();
        assert_eq!(cfg.initial_options().aspect, AspectRatio::Square);
    }

    #[test]
    fn watermark_color_formats_as_hex() {
        let style = WatermarkStyle {
            color: [255, 16, 0],
            ..WatermarkStyle::default()
        };
        assert_eq!(style.hex_color(), "#ff1000");
    }
}
