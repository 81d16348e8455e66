//! Oralia - a MIDI-driven piano theory trainer
//!
//! Entry point for the application.

use std::path::PathBuf;

use eframe::egui;

use oralia::app::OraliaApp;

/// Directory holding the persisted state and reference data.
/// Falls back to the working directory when no platform data dir exists.
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("oralia"))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let dir = data_dir();
    let state_path = dir.join("shared_data.json");
    let reference_path = dir.join("theory.json");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 640.0])
            .with_title("Oralia"),
        ..Default::default()
    };

    eframe::run_native(
        "Oralia",
        options,
        Box::new(move |_cc| Ok(Box::new(OraliaApp::new(state_path, reference_path)))),
    )
}
