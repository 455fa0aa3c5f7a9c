//! Text overlays (watermark badge, poster headline) rendered as SVG and composited onto a raster.

use std::sync::{Arc, OnceLock};

use image::RgbaImage;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{self, fontdb};

use crate::config::WatermarkStyle;

/// Pixel rectangle `(x, y, width, height)`.
pub type Rect = (u32, u32, u32, u32);

static FONT_DB: OnceLock<Arc<fontdb::Database>> = OnceLock::new();

fn font_db() -> Arc<fontdb::Database> {
    FONT_DB
        .get_or_init(|| {
            let mut db = fontdb::Database::new();
            db.load_system_fonts();
            tracing::debug!(faces = db.len(), "loaded system fonts for overlays");
            Arc::new(db)
        })
        .clone()
}

/// Badge placement for the watermark: bottom-right, inset by a small margin.
pub fn watermark_rect(width: u32, height: u32) -> Rect {
    let short = width.min(height);
    let margin = scale(short, 0.025).max(2);
    let badge_w = scale(width, 0.30)
        .max(24)
        .min(width.saturating_sub(2 * margin).max(1));
    let badge_h = scale(height, 0.065)
        .max(10)
        .min(height.saturating_sub(2 * margin).max(1));
    let x = width.saturating_sub(badge_w + margin);
    let y = height.saturating_sub(badge_h + margin);
    (x, y, badge_w.min(width), badge_h.min(height))
}

/// Band along the bottom edge used for the poster headline.
pub fn headline_rect(width: u32, height: u32) -> Rect {
    let band_h = scale(height, 0.14).clamp(1, height.max(1));
    (0, height.saturating_sub(band_h), width, band_h)
}

pub fn draw_watermark(image: &mut RgbaImage, style: &WatermarkStyle) -> anyhow::Result<()> {
    let (w, h) = image.dimensions();
    let (x, y, bw, bh) = watermark_rect(w, h);
    let font_size = f64::from(bh) * 0.55;
    let badge = format!(
        r#"<rect x="{x}" y="{y}" width="{bw}" height="{bh}" rx="{r}" fill="{fill}" fill-opacity="{op:.3}"/>"#,
        r = f64::from(bh) * 0.25,
        fill = style.hex_color(),
        op = style.opacity(),
    );
    let label = format!(
        r##"<text x="{cx}" y="{cy}" font-family="sans-serif" font-size="{font_size:.1}" font-weight="bold" fill="#ffffff" fill-opacity="{op:.3}" text-anchor="middle" dominant-baseline="central">{text}</text>"##,
        cx = f64::from(x) + f64::from(bw) / 2.0,
        cy = f64::from(y) + f64::from(bh) / 2.0,
        op = (style.opacity() + 0.3).min(1.0),
        text = escape_xml(&style.text),
    );
    let svg = format!("{}{badge}{label}</svg>", svg_open(w, h));
    composite_svg(image, &svg)
}

pub fn draw_headline(image: &mut RgbaImage, text: &str) -> anyhow::Result<()> {
    let (w, h) = image.dimensions();
    let (x, y, bw, bh) = headline_rect(w, h);
    let font_size = f64::from(bh) * 0.42;
    let band = format!(
        r##"<rect x="{x}" y="{y}" width="{bw}" height="{bh}" fill="#000000" fill-opacity="0.55"/>"##,
    );
    let label = format!(
        r##"<text x="{cx}" y="{cy}" font-family="sans-serif" font-size="{font_size:.1}" font-weight="bold" fill="#ffffff" text-anchor="middle" dominant-baseline="central">{text}</text>"##,
        cx = f64::from(w) / 2.0,
        cy = f64::from(y) + f64::from(bh) / 2.0,
        text = escape_xml(&text.to_uppercase()),
    );
    let svg = format!("{}{band}{label}</svg>", svg_open(w, h));
    composite_svg(image, &svg)
}

fn svg_open(width: u32, height: u32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    )
}

fn composite_svg(image: &mut RgbaImage, svg: &str) -> anyhow::Result<()> {
    let (w, h) = image.dimensions();
    let mut options = usvg::Options::default();
    options.fontdb = font_db();
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|err| anyhow::anyhow!("Failed to parse overlay SVG: {err}"))?;
    let mut pixmap =
        Pixmap::new(w, h).ok_or_else(|| anyhow::anyhow!("Invalid overlay size {w}x{h}"))?;
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let src = src.demultiply();
        dst.0 = over(
            dst.0,
            [src.red(), src.green(), src.blue(), src.alpha()],
        );
    }
    Ok(())
}

/// Source-over for straight-alpha pixels.
fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    let sa = f32::from(src[3]) / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    let da = f32::from(dst[3]) / 255.0;
    let out_a = da.mul_add(1.0 - sa, sa);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let sc = f32::from(src[c]) / 255.0;
        let dc = f32::from(dst[c]) / 255.0;
        let v = sc.mul_add(sa, dc * da * (1.0 - sa)) / out_a;
        out[c] = unit_to_u8(v);
    }
    out[3] = unit_to_u8(out_a);
    out
}

fn unit_to_u8(value: f32) -> u8 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

fn scale(value: u32, factor: f64) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (f64::from(value) * factor).round() as u32
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn white(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]))
    }

    #[test]
    fn watermark_rect_stays_inside_canvas() {
        for (w, h) in [(1024, 1024), (576, 1024), (1638, 1229), (40, 30), (12, 8)] {
            let (x, y, bw, bh) = watermark_rect(w, h);
            assert!(bw > 0 && bh > 0);
            assert!(x + bw <= w, "{w}x{h}");
            assert!(y + bh <= h, "{w}x{h}");
            assert!(x + bw / 2 >= w / 2, "badge sits on the right for {w}x{h}");
        }
    }

    #[test]
    fn watermark_darkens_badge_and_leaves_rest_untouched() {
        let mut img = white(200, 160);
        draw_watermark(&mut img, &WatermarkStyle::default()).expect("draw");
        let (x, y, bw, _) = watermark_rect(200, 160);
        // Top row of the badge, above the centered label.
        let inside = img.get_pixel(x + bw / 2, y + 1).0;
        assert!(inside[0] < 250, "badge should tint the pixel: {inside:?}");
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(10, 10).0, [255, 255, 255, 255]);
    }

    #[test]
    fn headline_band_covers_bottom_edge() {
        let mut img = white(120, 100);
        draw_headline(&mut img, "Summer <sale> & more").expect("draw");
        let (_, y, _, _) = headline_rect(120, 100);
        assert!(img.get_pixel(1, 99).0[0] < 200);
        assert_eq!(img.get_pixel(1, y.saturating_sub(2)).0, [255, 255, 255, 255]);
    }

    #[test]
    fn markup_in_watermark_text_still_renders() {
        let mut img = white(200, 160);
        let style = WatermarkStyle {
            text: r#"<Ad & "Co">"#.to_string(),
            ..WatermarkStyle::default()
        };
        draw_watermark(&mut img, &style).expect("escaped label parses");
        let (x, y, bw, _) = watermark_rect(200, 160);
        assert!(img.get_pixel(x + bw / 2, y + 1).0[0] < 250);
    }

    #[test]
    fn over_respects_alpha() {
        assert_eq!(over([10, 20, 30, 255], [0, 0, 0, 0]), [10, 20, 30, 255]);
        assert_eq!(over([10, 20, 30, 255], [200, 100, 0, 255]), [200, 100, 0, 255]);
        let half = over([255, 255, 255, 255], [0, 0, 0, 128]);
        assert!((126..=128).contains(&half[0]));
        assert_eq!(half[3], 255);
    }

    #[test]
    fn xml_special_characters_are_escaped() {
        assert_eq!(escape_xml(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
