mod filters;
mod load;
mod meta;
mod overlay;
mod preview;

pub use filters::FilterChain;
pub use load::{decode_upload, ensure_image_upload};
pub use meta::{ImageMeta, describe_aspect_ratio, format_system_time, human_readable_bytes};
pub use overlay::{draw_headline, draw_watermark};
#[cfg(test)]
pub use overlay::watermark_rect;
pub use preview::Preview;
