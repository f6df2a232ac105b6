use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::discover::PairingRule;

/// File looked up in the working directory by the binaries.
pub const CONFIG_FILE: &str = "seg-pipeline.json";

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

/// Paths and knobs for the data pipeline and the results viewer.
///
/// Every field has a default, so a config file only needs the keys it
/// overrides:
///
/// ```json
/// { "target_size": [128, 128], "desired_amount": 200 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub train_images_dir: PathBuf,
    pub train_masks_dir: PathBuf,
    pub test_images_dir: PathBuf,
    pub test_masks_dir: PathBuf,
    /// `[height, width]` every sample is resized to; `None` keeps the
    /// decoded size.
    pub target_size: Option<[u32; 2]>,
    /// Cap on the number of pairs turned into samples (first N in order).
    pub desired_amount: Option<usize>,
    pub val_fraction: f64,
    pub split_seed: u64,
    pub shuffle_buffer: usize,
    pub batch_size: usize,
    pub pairing: PairingRule,
    /// JSON history recorded by the training run.
    pub history_path: PathBuf,
    /// Where the loss/accuracy chart is written.
    pub chart_path: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            train_images_dir: PathBuf::from("data/train/images"),
            train_masks_dir: PathBuf::from("data/train/targets"),
            test_images_dir: PathBuf::from("data/test/images"),
            test_masks_dir: PathBuf::from("data/test/targets"),
            target_size: Some([256, 256]),
            desired_amount: None,
            val_fraction: 0.2,
            split_seed: 0,
            shuffle_buffer: 1000,
            batch_size: 32,
            pairing: PairingRule::default(),
            history_path: PathBuf::from("model2_training/200EpochsHistory.txt"),
            chart_path: PathBuf::from("model2_results/eval_over_time.png"),
        }
    }
}

impl PipelineConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Read `path` if it exists, otherwise fall back to the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            log::info!("Using config {}", path.display());
            Self::load(path)
        } else {
            log::debug!("{} not found, using default config", path.display());
            Ok(Self::default())
        }
    }

    /// `target_size` as the `(height, width)` pair the data layer expects.
    pub fn target_size(&self) -> Option<(u32, u32)> {
        self.target_size.map(|[h, w]| (h, w))
    }
}
