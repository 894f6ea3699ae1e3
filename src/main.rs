mod app;
mod chart;
mod color;
mod config;
mod data;
mod error;
mod export;
mod pipeline;
mod state;
mod ui;

use std::path::Path;

use anyhow::Context;
use app::ImpedanceApp;
use config::{PipelineConfig, CONFIG_FILE};
use eframe::egui;
use state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = PipelineConfig::load_or_default(Path::new(CONFIG_FILE))?;
    let output = pipeline::run(&config)?;
    let state = AppState::new(&output, config.export_dir.clone());

    if let Some(dir) = &config.export_dir {
        export::export_charts(&state.charts, &state.colors, dir)
            .with_context(|| format!("exporting charts to {}", dir.display()))?;
    }

    if !config.show_window {
        return Ok(());
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Impedance Trends – Rct / Re vs. Test ID",
        options,
        Box::new(|_cc| Ok(Box::new(ImpedanceApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("chart window failed: {e}"))
}
