use anyhow::Context as _;
use serde_json::json;
use std::io::{Cursor, Write as _};
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::sheet::preview_sheet;
use super::write_atomic;
use crate::studio::{GenerationOutput, StudioError, Variant};

const COPY_FILE: &str = "copy.txt";
const MANIFEST_FILE: &str = "manifest.json";
const SHEET_FILE: &str = "index.html";

/// How `export_all` ended up saving the variants.
#[derive(Debug)]
pub enum ExportOutcome {
    Zipped(PathBuf),
    /// The archive could not be written; the variants were saved one by one instead.
    FellBack {
        files: Vec<PathBuf>,
        zip_error: String,
    },
}

pub fn default_bundle_name(stem: &str, checksum: u32) -> String {
    let stem = stem.trim();
    let stem = if stem.is_empty() { "adstudio" } else { stem };
    format!("{stem}-{checksum:08x}.zip")
}

pub fn export_png(path: &Path, variant: &Variant) -> anyhow::Result<()> {
    let bytes = variant.encode_png()?;
    write_atomic(path, &bytes)?;
    tracing::info!(path = %path.display(), preset = variant.preset.name, "saved variant");
    Ok(())
}

/// Package every variant plus copy, manifest and preview sheet into an in-memory archive.
pub fn build_zip(output: &GenerationOutput, stem: &str) -> anyhow::Result<Vec<u8>> {
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let mut files = Vec::with_capacity(output.variants.len());
    for variant in &output.variants {
        let name = variant.file_name(stem);
        let png = variant.encode_png()?;
        zip.start_file(name.as_str(), stored)
            .with_context(|| format!("Failed to add {name} to archive"))?;
        zip.write_all(&png)
            .with_context(|| format!("Failed to write {name} to archive"))?;
        files.push(name);
    }

    let manifest = manifest_json(output, &files);
    let text_entries = [
        (COPY_FILE, output.copy.to_clipboard_text()),
        (
            MANIFEST_FILE,
            serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?,
        ),
        (SHEET_FILE, preview_sheet(output, &files).into_string()),
    ];
    for (name, contents) in text_entries {
        zip.start_file(name, deflated)
            .with_context(|| format!("Failed to add {name} to archive"))?;
        zip.write_all(contents.as_bytes())
            .with_context(|| format!("Failed to write {name} to archive"))?;
    }

    let cursor = zip.finish().context("Failed to finish archive")?;
    Ok(cursor.into_inner())
}

pub fn export_zip(path: &Path, output: &GenerationOutput, stem: &str) -> anyhow::Result<()> {
    let bytes = build_zip(output, stem)?;
    write_atomic(path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved archive");
    Ok(())
}

/// Save everything as one ZIP, or as separate PNGs next to `path` if the archive fails.
pub fn export_all(
    path: &Path,
    output: &GenerationOutput,
    stem: &str,
) -> Result<ExportOutcome, StudioError> {
    let zip_error = match export_zip(path, output, stem) {
        Ok(()) => return Ok(ExportOutcome::Zipped(path.to_path_buf())),
        Err(err) => format!("{err:#}"),
    };
    tracing::warn!(path = %path.display(), error = %zip_error, "archive failed, saving images individually");

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut files = Vec::with_capacity(output.variants.len());
    for variant in &output.variants {
        let target = dir.join(variant.file_name(stem));
        export_png(&target, variant).map_err(|err| {
            StudioError::Export(format!(
                "{zip_error}; saving {} individually also failed: {err:#}",
                target.display()
            ))
        })?;
        files.push(target);
    }
    Ok(ExportOutcome::FellBack { files, zip_error })
}

fn manifest_json(output: &GenerationOutput, files: &[String]) -> serde_json::Value {
    let variants: Vec<_> = output
        .variants
        .iter()
        .zip(files)
        .map(|(variant, file)| {
            json!({
                "index": variant.index + 1,
                "file": file,
                "preset": variant.preset.name,
                "filter": variant.preset.filter,
                "width": variant.image.width(),
                "height": variant.image.height(),
            })
        })
        .collect();
    json!({
        "generator": concat!("adstudio ", env!("CARGO_PKG_VERSION")),
        "created_at": output.created_at.to_rfc3339(),
        "options": output.options,
        "copy": output.copy,
        "variants": variants,
    })
}
