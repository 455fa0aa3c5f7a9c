use serde::{Deserialize, Serialize};

use super::StudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Photo,
    Poster,
}

impl Mode {
    pub const ALL: [Self; 2] = [Self::Photo, Self::Poster];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Photo => "Product photo",
            Self::Poster => "Poster",
        }
    }
}

/// Output aspect ratio; each entry maps to a fixed base canvas size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "9:16")]
    Story,
}

impl AspectRatio {
    pub const ALL: [Self; 4] = [Self::Square, Self::Portrait, Self::Landscape, Self::Story];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Square => "1:1",
            Self::Portrait => "3:4",
            Self::Landscape => "4:3",
            Self::Story => "9:16",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Square => "1:1 square",
            Self::Portrait => "3:4 portrait",
            Self::Landscape => "4:3 landscape",
            Self::Story => "9:16 story",
        }
    }

    /// Base canvas size in pixels before the quality multiplier.
    pub const fn base_size(self) -> (u32, u32) {
        match self {
            Self::Square => (1024, 1024),
            Self::Portrait => (768, 1024),
            Self::Landscape => (1024, 768),
            Self::Story => (576, 1024),
        }
    }

    pub fn from_key(key: &str) -> Result<Self, StudioError> {
        let key = key.trim();
        Self::ALL
            .into_iter()
            .find(|ratio| ratio.key() == key)
            .ok_or_else(|| StudioError::UnknownAspect(key.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Standard,
    High,
    Ultra,
}

impl Quality {
    pub const ALL: [Self; 3] = [Self::Standard, Self::High, Self::Ultra];

    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Standard => 1.0,
            Self::High => 1.3,
            Self::Ultra => 1.6,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::High => "high",
            Self::Ultra => "ultra",
        }
    }
}

/// Everything the user picked for one generation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudioOptions {
    pub mode: Mode,
    pub style: String,
    pub prompt: String,
    pub aspect: AspectRatio,
    pub quality: Quality,
    pub watermark: bool,
}

impl Default for StudioOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Photo,
            style: String::new(),
            prompt: String::new(),
            aspect: AspectRatio::Square,
            quality: Quality::Standard,
            watermark: true,
        }
    }
}

impl StudioOptions {
    /// Output canvas size: the aspect table entry scaled by the quality multiplier.
    pub fn canvas_size(&self) -> (u32, u32) {
        let (w, h) = self.aspect.base_size();
        let m = self.quality.multiplier();
        (scale_dim(w, m), scale_dim(h, m))
    }
}

fn scale_dim(value: u32, multiplier: f64) -> u32 {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        (f64::from(value) * multiplier).round().max(1.0) as u32
    }
}
