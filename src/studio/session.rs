use std::sync::Arc;

use chrono::NaiveDate;
use image::RgbaImage;

use super::quota::KeyValueStore;
use super::{GenerationOutput, StudioError, StudioOptions, UsageCounter, generate};
use crate::config::{ImageLimits, WatermarkStyle};
use crate::image::ImageMeta;

/// Decoded upload plus what is known about where it came from.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub pixels: Arc<RgbaImage>,
    pub meta: ImageMeta,
    /// CRC32 of the uploaded bytes, used to name export bundles.
    pub checksum: u32,
}

impl SourceImage {
    pub fn new(pixels: RgbaImage, meta: ImageMeta, bytes: &[u8]) -> Self {
        Self::from_pixels(pixels, meta, crc32fast::hash(bytes))
    }

    /// Wrap pixels whose source bytes were already hashed.
    pub fn from_pixels(pixels: RgbaImage, meta: ImageMeta, checksum: u32) -> Self {
        Self {
            pixels: Arc::new(pixels),
            meta,
            checksum,
        }
    }
}

/// Self-contained generation request that can run off the UI thread.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    source: Arc<RgbaImage>,
    options: StudioOptions,
    watermark: WatermarkStyle,
}

impl GenerationJob {
    pub fn run(self) -> Result<GenerationOutput, StudioError> {
        generate(&self.source, &self.options, &self.watermark)
    }
}

/// UI-independent controller state: upload, options, last output and quota.
#[derive(Debug)]
pub struct Session {
    pub options: StudioOptions,
    source: Option<SourceImage>,
    output: Option<GenerationOutput>,
    usage: UsageCounter,
    watermark: WatermarkStyle,
}

impl Session {
    pub const fn new(options: StudioOptions, usage: UsageCounter, watermark: WatermarkStyle) -> Self {
        Self {
            options,
            source: None,
            output: None,
            usage,
            watermark,
        }
    }

    pub const fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub const fn output(&self) -> Option<&GenerationOutput> {
        self.output.as_ref()
    }

    pub const fn usage(&self) -> &UsageCounter {
        &self.usage
    }

    pub const fn usage_mut(&mut self) -> &mut UsageCounter {
        &mut self.usage
    }

    /// Replace the upload. Results from the previous image are discarded.
    pub fn set_source(&mut self, source: SourceImage) {
        self.source = Some(source);
        self.output = None;
    }

    /// Move the usage counter to `today`, reading that day's stored count.
    pub fn roll_day<S: KeyValueStore + ?Sized>(&mut self, today: NaiveDate, store: Option<&S>) {
        self.usage.roll_to(today, store);
    }

    /// Guard clauses, in order: an upload must exist, then quota must remain.
    pub fn begin_generation(&self) -> Result<GenerationJob, StudioError> {
        let source = self.source.as_ref().ok_or(StudioError::NoImage)?;
        self.usage.check_available()?;
        Ok(GenerationJob {
            source: Arc::clone(&source.pixels),
            options: self.options.clone(),
            watermark: self.watermark.clone(),
        })
    }

    /// Store a finished run and count it. Failed runs leave everything as it was.
    pub fn finish_generation(
        &mut self,
        result: Result<GenerationOutput, StudioError>,
    ) -> Result<&GenerationOutput, StudioError> {
        let output = result?;
        self.usage.record_use();
        tracing::info!(
            used = self.usage.used(),
            remaining = self.usage.remaining(),
            "generation recorded"
        );
        Ok(self.output.insert(output))
    }

    /// Replace variant `index` with its 2x upscale and return the new size.
    /// An upscale beyond `limits` is refused and leaves the variant untouched.
    pub fn upscale_variant(
        &mut self,
        index: usize,
        limits: &ImageLimits,
    ) -> Result<(u32, u32), StudioError> {
        let variant = self
            .output
            .as_mut()
            .and_then(|output| output.variants.get_mut(index))
            .ok_or(StudioError::NoVariant(index + 1))?;
        *variant = variant.upscaled(limits)?;
        Ok(variant.image.dimensions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuotaConfig;
    use crate::studio::Mode;
    use image::Rgba;
    use std::collections::BTreeMap;

    struct NoStore;

    impl KeyValueStore for NoStore {
        fn get_string(&self, _key: &str) -> Option<String> {
            None
        }

        fn set_string(&mut self, _key: &str, _value: String) {}
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 4).expect("valid date")
    }

    fn session(limit: u32) -> Session {
        let quota = QuotaConfig {
            daily_limit: limit,
            key_prefix: "t".to_string(),
        };
        let usage = UsageCounter::load(None::<&NoStore>, &quota, today());
        Session::new(StudioOptions::default(), usage, WatermarkStyle::default())
    }

    fn source() -> SourceImage {
        let pixels = RgbaImage::from_pixel(8, 6, Rgba([90, 140, 200, 255]));
        SourceImage::new(pixels, ImageMeta::from_clipboard(None), b"bytes")
    }

    fn tiny_output() -> GenerationOutput {
        let canvas = RgbaImage::from_pixel(10, 8, Rgba([50, 60, 70, 255]));
        let options = StudioOptions {
            watermark: false,
            ..StudioOptions::default()
        };
        let variants = crate::studio::presets_for(Mode::Photo)
            .into_iter()
            .enumerate()
            .map(|(index, preset)| crate::studio::Variant {
                index,
                preset,
                image: canvas.clone(),
            })
            .collect();
        GenerationOutput {
            variants,
            copy: crate::studio::generate_copy(&options),
            options,
            created_at: chrono::Local::now(),
        }
    }

    #[test]
    fn generating_without_upload_fails_first() {
        let s = session(0);
        assert!(matches!(
            s.begin_generation(),
            Err(StudioError::NoImage)
        ));
    }

    #[test]
    fn exhausted_quota_blocks_generation() {
        let mut s = session(1);
        s.set_source(source());
        s.begin_generation().expect("first run allowed");
        s.finish_generation(Ok(tiny_output())).expect("stored");
        assert_eq!(s.usage().remaining(), 0);
        assert!(matches!(
            s.begin_generation(),
            Err(StudioError::QuotaExhausted { limit: 1 })
        ));
    }

    #[test]
    fn quota_resets_on_a_new_day() {
        let mut s = session(1);
        s.set_source(source());
        s.finish_generation(Ok(tiny_output())).expect("stored");
        let tomorrow = today().succ_opt().expect("next day");
        s.roll_day(tomorrow, None::<&NoStore>);
        assert!(s.begin_generation().is_ok());
    }

    #[test]
    fn new_day_with_a_spent_stored_count_stays_blocked() {
        struct SpentTomorrow;
        impl KeyValueStore for SpentTomorrow {
            fn get_string(&self, key: &str) -> Option<String> {
                (key == "t_2026-05-05").then(|| "30".to_string())
            }
            fn set_string(&mut self, _key: &str, _value: String) {}
        }

        let mut s = session(30);
        s.set_source(source());
        s.finish_generation(Ok(tiny_output())).expect("stored");
        let tomorrow = today().succ_opt().expect("next day");
        s.roll_day(tomorrow, Some(&SpentTomorrow));
        assert_eq!(s.usage().remaining(), 0);
        assert!(matches!(
            s.begin_generation(),
            Err(StudioError::QuotaExhausted { limit: 30 })
        ));
    }

    #[test]
    fn failed_generation_keeps_previous_state_and_quota() {
        let mut s = session(5);
        s.set_source(source());
        s.finish_generation(Ok(tiny_output())).expect("stored");
        let err = s
            .finish_generation(Err(StudioError::Render("boom".to_string())))
            .expect_err("propagates");
        assert!(matches!(err, StudioError::Render(_)));
        assert_eq!(s.usage().used(), 1);
        assert_eq!(s.output().map(|o| o.variants.len()), Some(4));
    }

    #[test]
    fn job_runs_with_session_options() {
        let mut s = session(3);
        s.set_source(source());
        s.options.watermark = false;
        s.options.aspect = crate::studio::AspectRatio::Landscape;
        let out = s
            .begin_generation()
            .expect("job")
            .run()
            .expect("run");
        assert_eq!(out.variants[0].image.dimensions(), (1024, 768));
        assert_eq!(s.usage().used(), 0, "counted only when finished");
    }

    #[test]
    fn upscale_replaces_only_the_chosen_variant() {
        let mut s = session(3);
        s.set_source(source());
        s.finish_generation(Ok(tiny_output())).expect("stored");
        let limits = ImageLimits::default();
        assert_eq!(s.upscale_variant(1, &limits).expect("upscaled"), (20, 16));
        let sizes: Vec<_> = s
            .output()
            .expect("output")
            .variants
            .iter()
            .map(|v| v.image.dimensions())
            .collect();
        assert_eq!(sizes, [(10, 8), (20, 16), (10, 8), (10, 8)]);
        assert!(matches!(
            s.upscale_variant(9, &limits),
            Err(StudioError::NoVariant(10))
        ));
    }

    #[test]
    fn refused_upscale_leaves_the_variant_unchanged() {
        let mut s = session(3);
        s.set_source(source());
        s.finish_generation(Ok(tiny_output())).expect("stored");
        let limits = ImageLimits {
            image_dim: 30,
            ..ImageLimits::default()
        };
        assert_eq!(s.upscale_variant(0, &limits).expect("first"), (20, 16));
        let err = s.upscale_variant(0, &limits).expect_err("40 > 30");
        assert!(matches!(err, StudioError::UpscaleTooLarge { index: 1, width: 40, height: 32 }));
        let variant = &s.output().expect("output").variants[0];
        assert_eq!(variant.image.dimensions(), (20, 16));
    }

    #[test]
    fn new_upload_clears_previous_output() {
        let mut s = session(3);
        s.set_source(source());
        s.finish_generation(Ok(tiny_output())).expect("stored");
        s.set_source(source());
        assert!(s.output().is_none());
        assert_eq!(s.source().map(|src| src.checksum), Some(crc32fast::hash(b"bytes")));
    }

    #[test]
    fn unsaved_counts_reach_the_store() {
        #[derive(Default)]
        struct Mem(BTreeMap<String, String>);
        impl KeyValueStore for Mem {
            fn get_string(&self, key: &str) -> Option<String> {
                self.0.get(key).cloned()
            }
            fn set_string(&mut self, key: &str, value: String) {
                self.0.insert(key.to_string(), value);
            }
        }

        let mut s = session(3);
        s.set_source(source());
        s.finish_generation(Ok(tiny_output())).expect("stored");
        let mut store = Mem::default();
        s.usage_mut().persist(&mut store);
        assert_eq!(store.get_string("t_2026-05-04").as_deref(), Some("1"));
    }
}
