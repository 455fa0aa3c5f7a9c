use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use image::RgbaImage;

/// GPU texture mirroring an RGBA raster for on-screen display.
pub struct Preview {
    pub size: [usize; 2],
    pub texture: TextureHandle,
}

impl Preview {
    pub fn from_rgba(ctx: &Context, name: &str, image: &RgbaImage) -> Self {
        let size = [image.width() as usize, image.height() as usize];
        let color = ColorImage::from_rgba_unmultiplied(size, image.as_raw());
        let texture = ctx.load_texture(name, color, TextureOptions::LINEAR);
        Self { size, texture }
    }

    /// Size that fits inside `max` while keeping the aspect ratio.
    pub fn fit_within(&self, max: egui::Vec2) -> egui::Vec2 {
        let [w, h] = self.size;
        if w == 0 || h == 0 {
            return egui::Vec2::ZERO;
        }
        let size = egui::vec2(
            crate::util::safe_usize_to_f32(w),
            crate::util::safe_usize_to_f32(h),
        );
        let scale = (max.x / size.x).min(max.y / size.y).min(1.0);
        size * scale
    }
}
