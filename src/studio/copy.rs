use serde::Serialize;

use super::{Mode, StudioOptions};

const PHOTO_CAPTION: &str = "{prompt}, styled {style}. Framed {aspect} and ready to post.";
const PHOTO_AD: &str =
    "Meet {prompt}: {style} looks in {quality} detail. Tap to shop before it sells out.";
const POSTER_CAPTION: &str = "{prompt} reimagined as a {style} poster.";
const POSTER_AD: &str =
    "New drop! {prompt} goes bold and {style}. {aspect} posters printed in {quality} quality.";

const FALLBACK_STYLE: &str = "signature";
const FALLBACK_PROMPT: &str = "your product";

/// Caption plus ad text for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyPair {
    pub caption: String,
    pub ad_text: String,
}

impl CopyPair {
    pub fn to_clipboard_text(&self) -> String {
        format!("{}\n\n{}", self.caption, self.ad_text)
    }
}

pub fn generate_copy(options: &StudioOptions) -> CopyPair {
    let (caption, ad) = match options.mode {
        Mode::Photo => (PHOTO_CAPTION, PHOTO_AD),
        Mode::Poster => (POSTER_CAPTION, POSTER_AD),
    };
    CopyPair {
        caption: fill_template(caption, options),
        ad_text: fill_template(ad, options),
    }
}

fn fill_template(template: &str, options: &StudioOptions) -> String {
    let style = non_empty_or(&options.style, FALLBACK_STYLE);
    let prompt = non_empty_or(&options.prompt, FALLBACK_PROMPT);

    let mut out = String::with_capacity(template.len() + style.len() + prompt.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start..];
        let Some(end) = after.find('}') else {
            out.push_str(after);
            return out;
        };
        let key = &after[1..end];
        match key {
            "style" => out.push_str(style),
            "prompt" => out.push_str(prompt),
            "aspect" => out.push_str(options.aspect.key()),
            "quality" => out.push_str(options.quality.label()),
            _ => out.push_str(&after[..=end]),
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    out
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::studio::{AspectRatio, Quality};

    fn options(mode: Mode, style: &str, prompt: &str) -> StudioOptions {
        StudioOptions {
            mode,
            style: style.to_string(),
            prompt: prompt.to_string(),
            aspect: AspectRatio::Story,
            quality: Quality::High,
            watermark: false,
        }
    }

    #[test]
    fn photo_copy_substitutes_every_field() {
        let pair = generate_copy(&options(Mode::Photo, "pastel", "Linen tote"));
        assert_eq!(
            pair.caption,
            "Linen tote, styled pastel. Framed 9:16 and ready to post."
        );
        assert_eq!(
            pair.ad_text,
            "Meet Linen tote: pastel looks in high detail. Tap to shop before it sells out."
        );
    }

    #[test]
    fn poster_copy_uses_poster_templates() {
        let pair = generate_copy(&options(Mode::Poster, "neon", "Trail shoes"));
        assert_eq!(pair.caption, "Trail shoes reimagined as a neon poster.");
        assert!(pair.ad_text.starts_with("New drop! Trail shoes goes bold and neon."));
        assert!(pair.ad_text.contains("9:16 posters printed in high quality"));
    }

    #[test]
    fn blank_fields_fall_back_to_defaults() {
        let pair = generate_copy(&options(Mode::Photo, "  ", ""));
        assert!(pair.caption.starts_with("your product, styled signature."));
        assert!(!pair.caption.contains('{'));
        assert!(!pair.ad_text.contains('{'));
    }

    #[test]
    fn braces_in_user_text_are_not_expanded() {
        let pair = generate_copy(&options(Mode::Poster, "{quality}", "Mug"));
        assert_eq!(pair.caption, "Mug reimagined as a {quality} poster.");
    }

    #[test]
    fn unknown_placeholders_are_left_verbatim() {
        let opts = options(Mode::Photo, "bold", "Lamp");
        assert_eq!(fill_template("{price} {style", &opts), "{price} {style");
    }

    #[test]
    fn clipboard_text_joins_both_parts() {
        let pair = CopyPair {
            caption: "a".to_string(),
            ad_text: "b".to_string(),
        };
        assert_eq!(pair.to_clipboard_text(), "a\n\nb");
    }
}
