use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::ColorImage;
use seg_pipeline::results::metrics::{EpochMetrics, TRAIN, VALIDATION};

use crate::color::CurveColors;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// Progress of writing the rendered chart to disk.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartExport {
    /// Waiting for a painted frame before asking for a screenshot.
    Pending,
    Requested,
    Saved(PathBuf),
    Failed(String),
}

/// The full UI state, independent of rendering.
pub struct ViewerState {
    pub metrics: EpochMetrics,
    pub colors: CurveColors,
    /// Where the chart image goes.
    pub chart_path: PathBuf,
    pub export: ChartExport,
}

impl ViewerState {
    pub fn new(metrics: EpochMetrics, chart_path: PathBuf) -> Self {
        Self {
            metrics,
            colors: CurveColors::new(&[TRAIN, VALIDATION]),
            chart_path,
            export: ChartExport::Pending,
        }
    }

    /// One-line description of the run shown above the plots.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} epochs", self.metrics.epochs())];
        if let Some(last) = self.metrics.val_accuracy.last() {
            parts.push(format!("final val accuracy {last:.4}"));
        }
        if let Some((epoch, best)) = self.metrics.best_val_accuracy() {
            parts.push(format!("best {best:.4} @ epoch {epoch}"));
        }
        if let Some((epoch, low)) = self.metrics.lowest_val_loss() {
            parts.push(format!("lowest val loss {low:.4} @ epoch {epoch}"));
        }
        parts.join(" | ")
    }

    /// Write a captured frame to `chart_path` and record the outcome.
    pub fn finish_export(&mut self, image: &ColorImage) {
        self.export = match write_png(image, &self.chart_path) {
            Ok(()) => {
                log::info!("chart saved to {}", self.chart_path.display());
                ChartExport::Saved(self.chart_path.clone())
            }
            Err(err) => {
                log::error!("saving chart failed: {err:#}");
                ChartExport::Failed(format!("{err:#}"))
            }
        };
    }

    pub fn status_message(&self) -> Option<String> {
        match &self.export {
            ChartExport::Pending | ChartExport::Requested => None,
            ChartExport::Saved(path) => Some(format!("Saved {}", path.display())),
            ChartExport::Failed(err) => Some(format!("Saving chart failed: {err}")),
        }
    }
}

/// Encode an egui frame capture as PNG, creating parent directories.
pub fn write_png(image: &ColorImage, path: &Path) -> Result<()> {
    let [width, height] = image.size;
    let bytes: Vec<u8> = image.pixels.iter().flat_map(|c| c.to_array()).collect();
    let rgba = image::RgbaImage::from_raw(width as u32, height as u32, bytes)
        .context("frame size does not match pixel count")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    rgba.save(path)
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use eframe::egui::Color32;
    use tempfile::TempDir;

    fn metrics() -> EpochMetrics {
        serde_json::from_str(concat!(
            r#"{"loss":[1.0,0.5],"accuracy":[0.5,0.8],"#,
            r#""val_loss":[1.1,0.6],"val_accuracy":[0.4,0.75]}"#,
        ))
        .unwrap()
    }

    #[test]
    fn summary_reports_epochs_and_best() {
        let state = ViewerState::new(metrics(), PathBuf::from("out.png"));
        let summary = state.summary();
        assert!(summary.starts_with("2 epochs"));
        assert!(summary.contains("best 0.7500 @ epoch 1"));
        assert!(summary.contains("lowest val loss 0.6000 @ epoch 1"));
    }

    #[test]
    fn export_writes_png_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results/eval_over_time.png");
        let mut state = ViewerState::new(metrics(), path.clone());
        assert_eq!(state.status_message(), None);

        let frame = ColorImage::new([3, 2], Color32::from_rgb(10, 20, 30));
        state.finish_export(&frame);
        assert_eq!(state.export, ChartExport::Saved(path.clone()));

        let saved = image::open(&path).unwrap().to_rgba8();
        assert_eq!(saved.dimensions(), (3, 2));
        assert_eq!(saved.get_pixel(2, 1).0, [10, 20, 30, 255]);
    }

    #[test]
    fn export_failure_is_reported() {
        let dir = TempDir::new().unwrap();
        // A file where the parent directory should be.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();
        let mut state = ViewerState::new(metrics(), blocker.join("chart.png"));

        state.finish_export(&ColorImage::new([1, 1], Color32::BLACK));
        assert!(matches!(state.export, ChartExport::Failed(_)));
        assert!(state.status_message().unwrap().starts_with("Saving chart failed"));
    }
}
