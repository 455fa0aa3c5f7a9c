use thiserror::Error;

/// Failures that reach the user as a single status message.
#[derive(Debug, Error)]
pub enum StudioError {
    #[error("{0} is not an image file.")]
    NotAnImage(String),
    #[error("Upload a product photo before generating.")]
    NoImage,
    #[error("Daily limit of {limit} generations reached. Try again tomorrow.")]
    QuotaExhausted { limit: u32 },
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Unknown aspect ratio '{0}'")]
    UnknownAspect(String),
    #[error("Rendering failed: {0}")]
    Render(String),
    #[error("There is no variant {0} to upscale.")]
    NoVariant(usize),
    #[error("Upscaling variant {index} to {width}×{height} would exceed the image limits.")]
    UpscaleTooLarge { index: usize, width: u64, height: u64 },
    #[error("Export failed: {0}")]
    Export(String),
}
