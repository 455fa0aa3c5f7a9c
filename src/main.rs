mod app;
mod config;
mod export;
mod image;
mod studio;
mod util;

use app::StudioApp;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let initial_image_path: Option<PathBuf> = std::env::args_os().nth(1).map(PathBuf::from);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting Ad Studio");
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([900.0, 600.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Ad Studio",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(StudioApp::new(
                cc,
                initial_image_path.as_deref(),
            )))
        }),
    )
}
