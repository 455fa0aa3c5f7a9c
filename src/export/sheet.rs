use maud::{DOCTYPE, Markup, html};

use crate::studio::GenerationOutput;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;background:#f5f5f5;color:#222}\
.grid{display:grid;grid-template-columns:repeat(2,minmax(0,1fr));gap:1rem}\
figure{margin:0;background:#fff;padding:.5rem;border-radius:6px}\
img{width:100%;height:auto;display:block}\
figcaption{font-size:.85rem;margin-top:.4rem;color:#555}\
blockquote{background:#fff;padding:1rem;border-left:4px solid #333}";

/// Preview sheet bundled with the ZIP; `files` are the archive names of the variants.
pub(super) fn preview_sheet(output: &GenerationOutput, files: &[String]) -> Markup {
    let options = &output.options;
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                title { "Ad Studio: " (options.mode.label()) }
                style { (STYLE) }
            }
            body {
                h1 { (options.mode.label()) " variants" }
                p {
                    "Aspect " (options.aspect.key())
                    ", " (options.quality.label()) " quality"
                    ", generated " (output.created_at.format("%Y-%m-%d %H:%M").to_string())
                }
                div class="grid" {
                    @for (variant, file) in output.variants.iter().zip(files) {
                        figure {
                            img src=(file) alt=(variant.preset.name);
                            figcaption {
                                (variant.index + 1) ". " (variant.preset.name)
                                " (" (variant.image.width()) "×" (variant.image.height()) ")"
                            }
                        }
                    }
                }
                h2 { "Caption" }
                blockquote { (output.copy.caption) }
                h2 { "Ad text" }
                blockquote { (output.copy.ad_text) }
            }
        }
    }
}
