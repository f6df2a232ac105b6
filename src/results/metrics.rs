use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// EpochMetrics – the history recorded by a training run
// ---------------------------------------------------------------------------

/// Per-epoch metrics, one entry per epoch in every series.
///
/// Expected JSON (extra keys are ignored):
///
/// ```json
/// {
///   "loss":         [1.0, 0.5],
///   "accuracy":     [0.5, 0.8],
///   "val_loss":     [1.1, 0.6],
///   "val_accuracy": [0.4, 0.75]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpochMetrics {
    #[serde(rename = "loss")]
    pub train_loss: Vec<f64>,
    #[serde(rename = "accuracy")]
    pub train_accuracy: Vec<f64>,
    pub val_loss: Vec<f64>,
    pub val_accuracy: Vec<f64>,
}

/// One named line of a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub name: &'static str,
    /// `[epoch, value]`, epochs counted from 0.
    pub points: Vec<[f64; 2]>,
}

pub const TRAIN: &str = "Train";
pub const VALIDATION: &str = "Validation";

impl EpochMetrics {
    /// Read and validate a history file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let metrics: EpochMetrics =
            serde_json::from_str(&text).map_err(|source| DataError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        metrics.validate()?;
        log::info!("loaded {} epochs from {}", metrics.epochs(), path.display());
        Ok(metrics)
    }

    /// Every series must have as many entries as `loss`.
    pub fn validate(&self) -> Result<()> {
        let expected = self.train_loss.len();
        for (key, series) in [
            ("accuracy", &self.train_accuracy),
            ("val_loss", &self.val_loss),
            ("val_accuracy", &self.val_accuracy),
        ] {
            if series.len() != expected {
                return Err(DataError::MetricLength {
                    key,
                    expected,
                    found: series.len(),
                });
            }
        }
        Ok(())
    }

    pub fn epochs(&self) -> usize {
        self.train_loss.len()
    }

    /// Train and validation loss over epochs.
    pub fn loss_curves(&self) -> [Curve; 2] {
        [
            curve(TRAIN, &self.train_loss),
            curve(VALIDATION, &self.val_loss),
        ]
    }

    /// Train and validation accuracy over epochs.
    pub fn accuracy_curves(&self) -> [Curve; 2] {
        [
            curve(TRAIN, &self.train_accuracy),
            curve(VALIDATION, &self.val_accuracy),
        ]
    }

    /// `(epoch, value)` of the highest validation accuracy.
    pub fn best_val_accuracy(&self) -> Option<(usize, f64)> {
        self.val_accuracy
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// `(epoch, value)` of the lowest validation loss.
    pub fn lowest_val_loss(&self) -> Option<(usize, f64)> {
        self.val_loss
            .iter()
            .copied()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

fn curve(name: &'static str, values: &[f64]) -> Curve {
    Curve {
        name,
        points: values
            .iter()
            .enumerate()
            .map(|(epoch, &v)| [epoch as f64, v])
            .collect(),
    }
}
