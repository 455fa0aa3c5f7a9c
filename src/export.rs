//! Saving generated variants: single PNGs, ZIP bundles and the per-image fallback.

mod atomic;
mod bundle;
mod sheet;

pub use atomic::write_atomic;
pub use bundle::{ExportOutcome, default_bundle_name, export_all, export_png};
#[cfg(test)]
pub use bundle::{build_zip, export_zip};
