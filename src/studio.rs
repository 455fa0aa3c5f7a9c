//! Variant generation: options, presets, copy templates, usage quota and the session controller.

mod copy;
mod error;
mod options;
mod presets;
mod quota;
mod render;
mod session;

pub use copy::{CopyPair, generate_copy};
pub use error::StudioError;
pub use options::{AspectRatio, Mode, Quality, StudioOptions};
pub use presets::{Preset, presets_for};
pub use quota::UsageCounter;
pub use render::{GenerationOutput, generate};
pub use render::Variant;
pub use session::{Session, SourceImage};
