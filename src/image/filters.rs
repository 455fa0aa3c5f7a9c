//! CSS `filter`-style chains (`brightness(1.1) sepia(0.3) blur(2px)`) over RGBA rasters.

use image::RgbaImage;
use rayon::prelude::*;
use thiserror::Error;

/// Minimum pixel count before parallelizing per-pixel work.
const PARALLEL_PIXEL_THRESHOLD: usize = 262_144; // 512x512
const MAX_BLUR_RADIUS: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterParseError {
    #[error("unknown filter function '{0}'")]
    UnknownFunction(String),
    #[error("invalid argument '{arg}' for {function}()")]
    InvalidArgument { function: String, arg: String },
    #[error("missing ')' after '{0}('")]
    Unterminated(String),
    #[error("unexpected input '{0}'")]
    Unexpected(String),
}

/// Single filter function with its resolved amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Brightness(f32),
    Contrast(f32),
    Saturate(f32),
    Grayscale(f32),
    Sepia(f32),
    Invert(f32),
    Opacity(f32),
    /// Rotation in degrees.
    HueRotate(f32),
    /// Radius in pixels.
    Blur(f32),
}

impl FilterOp {
    fn is_identity(self) -> bool {
        let near = |a: f32, b: f32| (a - b).abs() <= f32::EPSILON;
        match self {
            Self::Brightness(a) | Self::Contrast(a) | Self::Saturate(a) | Self::Opacity(a) => {
                near(a, 1.0)
            }
            Self::Grayscale(a) | Self::Sepia(a) | Self::Invert(a) => near(a, 0.0),
            Self::HueRotate(deg) => near(deg.rem_euclid(360.0), 0.0),
            Self::Blur(px) => blur_radius(px) == 0,
        }
    }

    /// Apply a per-pixel op to straight-alpha RGBA in `0..=1`.
    fn apply_pixel(self, [r, g, b, a]: [f32; 4]) -> [f32; 4] {
        let rgb = match self {
            Self::Brightness(k) => [r * k, g * k, b * k],
            Self::Contrast(k) => [
                (r - 0.5).mul_add(k, 0.5),
                (g - 0.5).mul_add(k, 0.5),
                (b - 0.5).mul_add(k, 0.5),
            ],
            Self::Saturate(s) => apply_matrix(&saturate_matrix(s), [r, g, b]),
            Self::Grayscale(amount) => {
                apply_matrix(&grayscale_matrix(amount.clamp(0.0, 1.0)), [r, g, b])
            }
            Self::Sepia(amount) => apply_matrix(&sepia_matrix(amount.clamp(0.0, 1.0)), [r, g, b]),
            Self::Invert(amount) => {
                let k = amount.clamp(0.0, 1.0);
                [
                    k.mul_add(1.0 - 2.0 * r, r),
                    k.mul_add(1.0 - 2.0 * g, g),
                    k.mul_add(1.0 - 2.0 * b, b),
                ]
            }
            Self::HueRotate(deg) => apply_matrix(&hue_rotate_matrix(deg), [r, g, b]),
            Self::Opacity(k) => return [r, g, b, (a * k.clamp(0.0, 1.0)).clamp(0.0, 1.0)],
            Self::Blur(_) => [r, g, b],
        };
        [
            rgb[0].clamp(0.0, 1.0),
            rgb[1].clamp(0.0, 1.0),
            rgb[2].clamp(0.0, 1.0),
            a,
        ]
    }
}

/// Ordered list of filter operations parsed from a CSS-like filter string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChain {
    ops: Vec<FilterOp>,
}

impl FilterChain {
    pub fn parse(input: &str) -> Result<Self, FilterParseError> {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
            return Ok(Self::default());
        }

        let mut ops = Vec::new();
        let mut rest = trimmed;
        while !rest.is_empty() {
            let name_len = rest
                .find(|ch: char| !(ch.is_ascii_alphabetic() || ch == '-'))
                .unwrap_or(rest.len());
            let name = &rest[..name_len];
            let after_name = &rest[name_len..];
            if name.is_empty() || !after_name.starts_with('(') {
                let token = rest.split_whitespace().next().unwrap_or(rest);
                return Err(FilterParseError::Unexpected(token.to_string()));
            }
            let Some(close) = after_name.find(')') else {
                return Err(FilterParseError::Unterminated(name.to_string()));
            };
            let arg = after_name[1..close].trim();
            ops.push(parse_function(&name.to_ascii_lowercase(), arg)?);
            rest = after_name[close + 1..].trim_start();
        }
        Ok(Self { ops })
    }

    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(|op| op.is_identity())
    }

    /// Run every op in order. Per-pixel ops between blurs are fused into one pass.
    pub fn apply(&self, base: &RgbaImage) -> RgbaImage {
        let mut out = base.clone();
        if self.is_identity() || out.width() == 0 || out.height() == 0 {
            return out;
        }

        let mut pending: Vec<FilterOp> = Vec::new();
        for op in &self.ops {
            match *op {
                FilterOp::Blur(px) => {
                    apply_pixel_ops(&mut out, &pending);
                    pending.clear();
                    out = box_blur(&out, blur_radius(px));
                }
                other if !other.is_identity() => pending.push(other),
                _ => {}
            }
        }
        apply_pixel_ops(&mut out, &pending);
        out
    }
}

fn parse_function(name: &str, arg: &str) -> Result<FilterOp, FilterParseError> {
    let invalid = || FilterParseError::InvalidArgument {
        function: name.to_string(),
        arg: arg.to_string(),
    };
    let amount = |default: f32| -> Result<f32, FilterParseError> {
        if arg.is_empty() {
            return Ok(default);
        }
        parse_amount(arg).filter(|v| *v >= 0.0).ok_or_else(invalid)
    };

    let op = match name {
        "brightness" => FilterOp::Brightness(amount(1.0)?),
        "contrast" => FilterOp::Contrast(amount(1.0)?),
        "saturate" => FilterOp::Saturate(amount(1.0)?),
        "grayscale" => FilterOp::Grayscale(amount(1.0)?),
        "sepia" => FilterOp::Sepia(amount(1.0)?),
        "invert" => FilterOp::Invert(amount(1.0)?),
        "opacity" => FilterOp::Opacity(amount(1.0)?),
        "hue-rotate" => {
            if arg.is_empty() {
                FilterOp::HueRotate(0.0)
            } else {
                FilterOp::HueRotate(parse_angle(arg).ok_or_else(invalid)?)
            }
        }
        "blur" => {
            if arg.is_empty() {
                FilterOp::Blur(0.0)
            } else {
                let px = arg.strip_suffix("px").unwrap_or(arg).trim();
                let value = parse_number(px).filter(|v| *v >= 0.0).ok_or_else(invalid)?;
                FilterOp::Blur(value)
            }
        }
        _ => return Err(FilterParseError::UnknownFunction(name.to_string())),
    };
    Ok(op)
}

fn parse_number(text: &str) -> Option<f32> {
    let value = text.trim().parse::<f32>().ok()?;
    value.is_finite().then_some(value)
}

/// Plain number or percentage (`1.2`, `120%`).
fn parse_amount(text: &str) -> Option<f32> {
    text.strip_suffix('%')
        .map_or_else(|| parse_number(text), |pct| parse_number(pct).map(|v| v / 100.0))
}

/// Angle in degrees from `deg`, `rad`, `grad` or `turn` units; bare zero is allowed.
fn parse_angle(text: &str) -> Option<f32> {
    let text = text.trim();
    if let Some(v) = text.strip_suffix("deg") {
        return parse_number(v);
    }
    if let Some(v) = text.strip_suffix("grad") {
        return parse_number(v).map(|g| g * 0.9);
    }
    if let Some(v) = text.strip_suffix("rad") {
        return parse_number(v).map(f32::to_degrees);
    }
    if let Some(v) = text.strip_suffix("turn") {
        return parse_number(v).map(|t| t * 360.0);
    }
    parse_number(text).filter(|v| *v == 0.0)
}

fn blur_radius(px: f32) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let radius = px.max(0.0).round() as u32;
    radius.min(MAX_BLUR_RADIUS)
}

type Matrix3 = [[f32; 3]; 3];

fn apply_matrix(m: &Matrix3, [r, g, b]: [f32; 3]) -> [f32; 3] {
    [
        m[0][2].mul_add(b, m[0][0].mul_add(r, m[0][1] * g)),
        m[1][2].mul_add(b, m[1][0].mul_add(r, m[1][1] * g)),
        m[2][2].mul_add(b, m[2][0].mul_add(r, m[2][1] * g)),
    ]
}

fn saturate_matrix(s: f32) -> Matrix3 {
    [
        [0.787f32.mul_add(s, 0.213), 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.285f32.mul_add(s, 0.715), 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.928f32.mul_add(s, 0.072)],
    ]
}

fn grayscale_matrix(amount: f32) -> Matrix3 {
    let s = 1.0 - amount;
    [
        [0.7874f32.mul_add(s, 0.2126), 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.2848f32.mul_add(s, 0.7152), 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.9278f32.mul_add(s, 0.0722)],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix3 {
    let s = 1.0 - amount;
    [
        [0.607f32.mul_add(s, 0.393), 0.769 - 0.769 * s, 0.189 - 0.189 * s],
        [0.349 - 0.349 * s, 0.314f32.mul_add(s, 0.686), 0.168 - 0.168 * s],
        [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.869f32.mul_add(s, 0.131)],
    ]
}

fn hue_rotate_matrix(deg: f32) -> Matrix3 {
    let (sin, cos) = deg.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

fn apply_pixel_ops(image: &mut RgbaImage, ops: &[FilterOp]) {
    if ops.is_empty() {
        return;
    }
    let map_pixel = |px: &mut [u8]| {
        let mut value = [
            f32::from(px[0]) / 255.0,
            f32::from(px[1]) / 255.0,
            f32::from(px[2]) / 255.0,
            f32::from(px[3]) / 255.0,
        ];
        for op in ops {
            value = op.apply_pixel(value);
        }
        for (dst, v) in px.iter_mut().zip(value) {
            *dst = float_to_u8(v);
        }
    };

    let total_pixels = image.width() as usize * image.height() as usize;
    let data: &mut [u8] = image;
    if total_pixels >= PARALLEL_PIXEL_THRESHOLD {
        data.par_chunks_mut(4).for_each(map_pixel);
    } else {
        data.chunks_mut(4).for_each(map_pixel);
    }
}

fn float_to_u8(value: f32) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

/// Separable box blur using per-row and per-column prefix sums.
fn box_blur(image: &RgbaImage, radius: u32) -> RgbaImage {
    let (w, h) = image.dimensions();
    if radius == 0 || w == 0 || h == 0 {
        return image.clone();
    }
    let width = w as usize;
    let height = h as usize;
    let radius = radius as usize;
    let src: &[u8] = image;

    let mut horiz = vec![0u8; width * height * 4];
    horiz
        .par_chunks_mut(width * 4)
        .enumerate()
        .for_each(|(y, row)| {
            let src_row = &src[y * width * 4..(y + 1) * width * 4];
            let mut prefix = vec![[0u32; 4]; width + 1];
            for x in 0..width {
                for c in 0..4 {
                    prefix[x + 1][c] = prefix[x][c] + u32::from(src_row[x * 4 + c]);
                }
            }
            for x in 0..width {
                let x0 = x.saturating_sub(radius);
                let x1 = (x + radius).min(width - 1);
                write_average(&mut row[x * 4..x * 4 + 4], prefix[x1 + 1], prefix[x0], x1 - x0 + 1);
            }
        });

    let mut out = vec![0u8; width * height * 4];
    let columns: Vec<Vec<u8>> = (0..width)
        .into_par_iter()
        .map(|x| {
            let mut prefix = vec![[0u32; 4]; height + 1];
            for y in 0..height {
                let idx = (y * width + x) * 4;
                for c in 0..4 {
                    prefix[y + 1][c] = prefix[y][c] + u32::from(horiz[idx + c]);
                }
            }
            let mut column = vec![0u8; height * 4];
            for y in 0..height {
                let y0 = y.saturating_sub(radius);
                let y1 = (y + radius).min(height - 1);
                write_average(
                    &mut column[y * 4..y * 4 + 4],
                    prefix[y1 + 1],
                    prefix[y0],
                    y1 - y0 + 1,
                );
            }
            column
        })
        .collect();
    for (x, column) in columns.iter().enumerate() {
        for y in 0..height {
            let idx = (y * width + x) * 4;
            out[idx..idx + 4].copy_from_slice(&column[y * 4..y * 4 + 4]);
        }
    }

    RgbaImage::from_raw(w, h, out).unwrap_or_else(|| image.clone())
}

fn write_average(dst: &mut [u8], sum: [u32; 4], base: [u32; 4], count: usize) {
    let count = u32::try_from(count).unwrap_or(u32::MAX).max(1);
    for c in 0..4 {
        let avg = (sum[c] - base[c] + count / 2) / count;
        dst[c] = u8::try_from(avg).unwrap_or(u8::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(px))
    }

    #[test]
    fn parses_numbers_percentages_and_units() {
        let chain =
            FilterChain::parse("brightness(120%) contrast(0.8) hue-rotate(0.5turn) blur(2px)")
                .expect("parse");
        assert_eq!(
            chain.ops.as_slice(),
            &[
                FilterOp::Brightness(1.2),
                FilterOp::Contrast(0.8),
                FilterOp::HueRotate(180.0),
                FilterOp::Blur(2.0),
            ]
        );
    }

    #[test]
    fn empty_and_none_are_identity() {
        assert!(FilterChain::parse("").expect("empty").is_identity());
        assert!(FilterChain::parse("none").expect("none").is_identity());
        assert!(
            FilterChain::parse("brightness(1) sepia(0) blur(0px)")
                .expect("neutral")
                .is_identity()
        );
    }

    #[test]
    fn missing_argument_uses_function_default() {
        let chain = FilterChain::parse("grayscale() hue-rotate()").expect("parse");
        assert_eq!(
            chain.ops.as_slice(),
            &[FilterOp::Grayscale(1.0), FilterOp::HueRotate(0.0)]
        );
    }

    #[test]
    fn reports_malformed_input() {
        assert_eq!(
            FilterChain::parse("glow(2)"),
            Err(FilterParseError::UnknownFunction("glow".to_string()))
        );
        assert_eq!(
            FilterChain::parse("brightness(-1)"),
            Err(FilterParseError::InvalidArgument {
                function: "brightness".to_string(),
                arg: "-1".to_string(),
            })
        );
        assert_eq!(
            FilterChain::parse("hue-rotate(30)"),
            Err(FilterParseError::InvalidArgument {
                function: "hue-rotate".to_string(),
                arg: "30".to_string(),
            })
        );
        assert_eq!(
            FilterChain::parse("sepia(0.5"),
            Err(FilterParseError::Unterminated("sepia".to_string()))
        );
        assert_eq!(
            FilterChain::parse("sepia(0.5) ???"),
            Err(FilterParseError::Unexpected("???".to_string()))
        );
    }

    #[test]
    fn identity_chain_leaves_pixels_untouched() {
        let img = RgbaImage::from_fn(5, 3, |x, y| Rgba([x as u8 * 40, y as u8 * 60, 7, 255]));
        let out = FilterChain::parse("none").expect("parse").apply(&img);
        assert_eq!(out, img);
    }

    #[test]
    fn brightness_scales_channels_and_keeps_alpha() {
        let img = solid(2, 2, [100, 50, 200, 128]);
        let out = FilterChain::parse("brightness(1.5)").expect("parse").apply(&img);
        assert_eq!(out.get_pixel(0, 0).0, [150, 75, 255, 128]);
    }

    #[test]
    fn contrast_pivots_on_mid_gray() {
        let img = solid(1, 1, [64, 128, 192, 255]);
        let out = FilterChain::parse("contrast(0)").expect("parse").apply(&img);
        assert_eq!(out.get_pixel(0, 0).0, [128, 128, 128, 255]);
    }

    #[test]
    fn full_grayscale_equalizes_channels() {
        let img = solid(1, 1, [200, 40, 90, 255]);
        let out = FilterChain::parse("grayscale(1)").expect("parse").apply(&img);
        let [r, g, b, _] = out.get_pixel(0, 0).0;
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn invert_flips_channels() {
        let img = solid(1, 1, [0, 255, 55, 255]);
        let out = FilterChain::parse("invert(100%)").expect("parse").apply(&img);
        assert_eq!(out.get_pixel(0, 0).0, [255, 0, 200, 255]);
    }

    #[test]
    fn opacity_scales_alpha_only() {
        let img = solid(1, 1, [10, 20, 30, 200]);
        let out = FilterChain::parse("opacity(0.5)").expect("parse").apply(&img);
        assert_eq!(out.get_pixel(0, 0).0, [10, 20, 30, 100]);
    }

    #[test]
    fn blur_spreads_a_single_bright_pixel() {
        let mut img = solid(5, 5, [0, 0, 0, 255]);
        img.put_pixel(2, 2, Rgba([255, 255, 255, 255]));
        let out = FilterChain::parse("blur(1px)").expect("parse").apply(&img);
        assert!(out.get_pixel(2, 2).0[0] < 255);
        assert!(out.get_pixel(1, 1).0[0] > 0);
        assert_eq!(out.get_pixel(0, 4).0[0], 0);
        assert_eq!(out.dimensions(), (5, 5));
    }

    #[test]
    fn full_hue_turn_is_identity() {
        assert!(
            FilterChain::parse("hue-rotate(360deg)")
                .expect("parse")
                .is_identity()
        );
    }
}
