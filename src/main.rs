mod app;
mod color;
mod state;
mod ui;

use std::path::Path;

use anyhow::{Context, Result};
use app::ResultsApp;
use eframe::egui;
use seg_pipeline::config::{PipelineConfig, CONFIG_FILE};
use seg_pipeline::results::metrics::EpochMetrics;
use state::ViewerState;

fn main() -> Result<()> {
    env_logger::init();

    let config = PipelineConfig::load_or_default(Path::new(CONFIG_FILE))?;
    let metrics = EpochMetrics::load(&config.history_path)
        .with_context(|| format!("loading training history {}", config.history_path.display()))?;
    let state = ViewerState::new(metrics, config.chart_path.clone());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 600.0])
            .with_min_inner_size([600.0, 300.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Segmentation – Training Results",
        options,
        Box::new(|_cc| Ok(Box::new(ResultsApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("viewer failed: {e}"))
}
