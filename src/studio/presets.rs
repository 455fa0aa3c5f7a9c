use super::Mode;

/// A named filter string applied to the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    pub filter: &'static str,
}

pub const PRESETS: [Preset; 4] = [
    Preset {
        name: "Studio",
        filter: "brightness(1.05) contrast(1.1) saturate(1.1)",
    },
    Preset {
        name: "Warm",
        filter: "sepia(0.25) saturate(1.3) brightness(1.03)",
    },
    Preset {
        name: "Cool",
        filter: "hue-rotate(-12deg) saturate(0.9) contrast(1.05)",
    },
    Preset {
        name: "Noir",
        filter: "grayscale(1) contrast(1.25) brightness(0.95)",
    },
];

/// Presets in render order; poster mode walks the table backwards.
pub fn presets_for(mode: Mode) -> [Preset; 4] {
    let mut presets = PRESETS;
    if mode == Mode::Poster {
        presets.reverse();
    }
    presets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::FilterChain;

    #[test]
    fn photo_mode_keeps_table_order() {
        let names: Vec<_> = presets_for(Mode::Photo).iter().map(|p| p.name).collect();
        assert_eq!(names, ["Studio", "Warm", "Cool", "Noir"]);
    }

    #[test]
    fn poster_mode_reverses_table_order() {
        let names: Vec<_> = presets_for(Mode::Poster).iter().map(|p| p.name).collect();
        assert_eq!(names, ["Noir", "Cool", "Warm", "Studio"]);
    }

    #[test]
    fn every_preset_parses_to_a_non_identity_chain() {
        for preset in PRESETS {
            let chain = FilterChain::parse(preset.filter)
                .unwrap_or_else(|err| panic!("{}: {err}", preset.name));
            assert!(!chain.is_identity(), "{} should change pixels", preset.name);
        }
    }
}
