use std::io::Cursor;

use anyhow::Context as _;
use chrono::{DateTime, Local};
use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use rayon::prelude::*;

use super::{CopyPair, Mode, Preset, StudioError, StudioOptions, generate_copy, presets_for};
use crate::config::{ImageLimits, WatermarkStyle};
use crate::image::{FilterChain, draw_headline, draw_watermark};

const DEFAULT_HEADLINE: &str = "New arrival";

/// One generated image output.
#[derive(Debug, Clone)]
pub struct Variant {
    pub index: usize,
    pub preset: Preset,
    pub image: RgbaImage,
}

impl Variant {
    pub fn encode_png(&self) -> anyhow::Result<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.image
            .write_to(&mut out, ImageFormat::Png)
            .with_context(|| format!("Failed to encode variant {} as PNG", self.index + 1))?;
        Ok(out.into_inner())
    }

    /// Copy of this variant at exactly twice the width and height.
    pub fn upscaled(&self, limits: &ImageLimits) -> Result<Self, StudioError> {
        let (width, height) = self.upscaled_size(limits)?;
        let image = imageops::resize(&self.image, width, height, FilterType::Lanczos3);
        Ok(Self {
            index: self.index,
            preset: self.preset,
            image,
        })
    }

    /// Doubled size, or `UpscaleTooLarge` when it would break any of `limits`.
    pub fn upscaled_size(&self, limits: &ImageLimits) -> Result<(u32, u32), StudioError> {
        let (w, h) = self.image.dimensions();
        let too_large = || StudioError::UpscaleTooLarge {
            index: self.index + 1,
            width: u64::from(w) * 2,
            height: u64::from(h) * 2,
        };
        let (Some(width), Some(height)) = (w.checked_mul(2), h.checked_mul(2)) else {
            return Err(too_large());
        };
        let pixels = u64::from(width).checked_mul(u64::from(height));
        let bytes = pixels.and_then(|p| p.checked_mul(4));
        match (pixels, bytes) {
            (Some(pixels), Some(bytes))
                if width <= limits.image_dim
                    && height <= limits.image_dim
                    && pixels <= limits.total_pixels
                    && bytes <= limits.alloc_bytes =>
            {
                Ok((width, height))
            }
            _ => Err(too_large()),
        }
    }

    pub fn file_name(&self, stem: &str) -> String {
        format!(
            "{stem}-variant-{}-{}.png",
            self.index + 1,
            self.preset.name.to_ascii_lowercase()
        )
    }
}

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationOutput {
    pub variants: Vec<Variant>,
    pub copy: CopyPair,
    pub options: StudioOptions,
    pub created_at: DateTime<Local>,
}

/// Scale `source` to cover a `width`×`height` canvas, then crop the center.
pub fn cover_fit(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (sw, sh) = source.dimensions();
    if sw == 0 || sh == 0 || width == 0 || height == 0 {
        return RgbaImage::new(width, height);
    }
    if (sw, sh) == (width, height) {
        return source.clone();
    }
    let scale = (f64::from(width) / f64::from(sw)).max(f64::from(height) / f64::from(sh));
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (rw, rh) = (
        ((f64::from(sw) * scale).ceil() as u32).max(width),
        ((f64::from(sh) * scale).ceil() as u32).max(height),
    );
    let resized = imageops::resize(source, rw, rh, FilterType::CatmullRom);
    let x = (rw - width) / 2;
    let y = (rh - height) / 2;
    imageops::crop_imm(&resized, x, y, width, height).to_image()
}

/// Produce the four variants and the copy pair for `options`.
#[tracing::instrument(skip_all, fields(mode = ?options.mode, aspect = options.aspect.key()))]
pub fn generate(
    source: &RgbaImage,
    options: &StudioOptions,
    watermark: &WatermarkStyle,
) -> Result<GenerationOutput, StudioError> {
    let (width, height) = options.canvas_size();
    let canvas = cover_fit(source, width, height);
    let variants = render_variants(&canvas, options, watermark)?;
    tracing::info!(width, height, "generated {} variants", variants.len());
    Ok(GenerationOutput {
        variants,
        copy: generate_copy(options),
        options: options.clone(),
        created_at: Local::now(),
    })
}

/// Render every preset over an already-fitted canvas. Variants are independent,
/// so they render in parallel; the output keeps preset order.
fn render_variants(
    canvas: &RgbaImage,
    options: &StudioOptions,
    watermark: &WatermarkStyle,
) -> Result<Vec<Variant>, StudioError> {
    presets_for(options.mode)
        .par_iter()
        .enumerate()
        .map(|(index, preset)| render_variant(canvas, index, *preset, options, watermark))
        .collect()
}

fn render_variant(
    canvas: &RgbaImage,
    index: usize,
    preset: Preset,
    options: &StudioOptions,
    watermark: &WatermarkStyle,
) -> Result<Variant, StudioError> {
    let chain = FilterChain::parse(preset.filter)
        .map_err(|err| StudioError::Render(format!("preset {}: {err}", preset.name)))?;
    let mut image = chain.apply(canvas);

    if options.mode == Mode::Poster {
        draw_headline(&mut image, headline_text(options))
            .map_err(|err| StudioError::Render(format!("{err:#}")))?;
    }
    if options.watermark {
        draw_watermark(&mut image, watermark)
            .map_err(|err| StudioError::Render(format!("{err:#}")))?;
    }
    Ok(Variant {
        index,
        preset,
        image,
    })
}

fn headline_text(options: &StudioOptions) -> &str {
    [options.style.trim(), options.prompt.trim()]
        .into_iter()
        .find(|s| !s.is_empty())
        .unwrap_or(DEFAULT_HEADLINE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::watermark_rect;
    use crate::studio::presets::PRESETS;
    use crate::studio::{AspectRatio, Quality};
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 120, 255])
        })
    }

    fn photo(watermark: bool) -> StudioOptions {
        StudioOptions {
            mode: Mode::Photo,
            style: "clean".to_string(),
            prompt: "Desk lamp".to_string(),
            aspect: AspectRatio::Square,
            quality: Quality::Standard,
            watermark,
        }
    }

    #[test]
    fn generate_outputs_canvas_sized_variants_and_copy() {
        let options = StudioOptions {
            aspect: AspectRatio::Story,
            quality: Quality::High,
            watermark: false,
            ..photo(false)
        };
        let out = generate(&gradient(300, 200), &options, &WatermarkStyle::default())
            .expect("generate");
        assert_eq!(out.variants.len(), 4);
        for variant in &out.variants {
            assert_eq!(variant.image.dimensions(), (749, 1331));
        }
        assert_eq!(out.copy, generate_copy(&options));
        assert_eq!(out.options, options);
    }

    #[test]
    fn variants_follow_preset_order_per_mode() {
        let canvas = gradient(32, 24);
        let wm = WatermarkStyle::default();
        let photo_names: Vec<_> = render_variants(&canvas, &photo(false), &wm)
            .expect("render")
            .iter()
            .map(|v| v.preset.name)
            .collect();
        assert_eq!(photo_names, PRESETS.map(|p| p.name));

        let poster = StudioOptions {
            mode: Mode::Poster,
            ..photo(false)
        };
        let variants = render_variants(&canvas, &poster, &wm).expect("render");
        let poster_names: Vec<_> = variants.iter().map(|v| v.preset.name).collect();
        let mut reversed = PRESETS.map(|p| p.name);
        reversed.reverse();
        assert_eq!(poster_names, reversed);
        assert_eq!(
            variants.iter().map(|v| v.index).collect::<Vec<_>>(),
            [0, 1, 2, 3]
        );
    }

    #[test]
    fn watermark_present_only_when_enabled() {
        let canvas = gradient(160, 120);
        let wm = WatermarkStyle::default();
        let plain = render_variants(&canvas, &photo(false), &wm).expect("plain");
        let marked = render_variants(&canvas, &photo(true), &wm).expect("marked");
        let (x, y, bw, bh) = watermark_rect(160, 120);

        for (p, m) in plain.iter().zip(&marked) {
            let filtered = FilterChain::parse(p.preset.filter)
                .expect("preset")
                .apply(&canvas);
            assert_eq!(p.image, filtered, "{} without watermark", p.preset.name);

            let badge_changed = (x..x + bw)
                .flat_map(|px| (y..y + bh).map(move |py| (px, py)))
                .any(|(px, py)| p.image.get_pixel(px, py) != m.image.get_pixel(px, py));
            assert!(badge_changed, "{} should carry a watermark", m.preset.name);
            assert_eq!(p.image.get_pixel(0, 0), m.image.get_pixel(0, 0));
        }
    }

    #[test]
    fn upscale_doubles_dimensions_exactly() {
        let limits = ImageLimits::default();
        let variant = Variant {
            index: 2,
            preset: PRESETS[2],
            image: gradient(33, 17),
        };
        let up = variant.upscaled(&limits).expect("within limits");
        assert_eq!(up.image.dimensions(), (66, 34));
        assert_eq!(up.index, 2);
        assert_eq!(up.preset, PRESETS[2]);
        let again = up.upscaled(&limits).expect("within limits");
        assert_eq!(again.image.dimensions(), (132, 68));
    }

    #[test]
    fn upscale_past_any_limit_is_refused() {
        let variant = Variant {
            index: 0,
            preset: PRESETS[0],
            image: gradient(40, 30),
        };
        let generous = ImageLimits {
            image_dim: 1_000,
            total_pixels: 1_000_000,
            alloc_bytes: 64 * 1024 * 1024,
        };
        assert_eq!(variant.upscaled_size(&generous).expect("fits"), (80, 60));

        let narrow = ImageLimits {
            image_dim: 79,
            ..generous.clone()
        };
        let few_pixels = ImageLimits {
            total_pixels: 80 * 60 - 1,
            ..generous.clone()
        };
        let small_alloc = ImageLimits {
            alloc_bytes: 80 * 60 * 4 - 1,
            ..generous
        };
        for limits in [narrow, few_pixels, small_alloc] {
            assert!(matches!(
                variant.upscaled(&limits),
                Err(StudioError::UpscaleTooLarge {
                    index: 1,
                    width: 80,
                    height: 60
                })
            ));
        }
    }

    #[test]
    fn upscale_overflowing_u32_is_refused() {
        let variant = Variant {
            index: 3,
            preset: PRESETS[3],
            image: RgbaImage::new(0x8000_0000, 0),
        };
        let unlimited = ImageLimits {
            image_dim: u32::MAX,
            total_pixels: u64::MAX,
            alloc_bytes: u64::MAX,
        };
        assert!(matches!(
            variant.upscaled_size(&unlimited),
            Err(StudioError::UpscaleTooLarge { index: 4, .. })
        ));
    }

    #[test]
    fn cover_fit_fills_canvas_and_crops_center() {
        let source = RgbaImage::from_fn(100, 50, |x, _| {
            if x < 50 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let fitted = cover_fit(&source, 40, 40);
        assert_eq!(fitted.dimensions(), (40, 40));
        assert!(fitted.get_pixel(2, 20).0[0] > 200);
        assert!(fitted.get_pixel(37, 20).0[2] > 200);
    }

    #[test]
    fn png_encoding_round_trips_dimensions() {
        let variant = Variant {
            index: 0,
            preset: PRESETS[0],
            image: gradient(9, 4),
        };
        let bytes = variant.encode_png().expect("encode");
        let decoded = image::load_from_memory(&bytes).expect("decode").to_rgba8();
        assert_eq!(decoded, variant.image);
        assert_eq!(variant.file_name("mug"), "mug-variant-1-studio.png");
    }

    #[test]
    fn headline_prefers_style_then_prompt() {
        let mut options = photo(false);
        assert_eq!(headline_text(&options), "clean");
        options.style = " ".to_string();
        assert_eq!(headline_text(&options), "Desk lamp");
        options.prompt.clear();
        assert_eq!(headline_text(&options), DEFAULT_HEADLINE);
    }
}
