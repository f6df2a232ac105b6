//! Pre-disaster image segmentation data pipeline.
//!
//! * [`data`] finds image/mask pairs, decodes them lazily, splits, augments
//!   and batches them.
//! * [`results`] loads the per-epoch metrics a training run recorded.
//! * [`config`] holds the paths and knobs both sides share.

pub mod config;
pub mod data;
pub mod error;
pub mod results;

pub use error::{DataError, Result};
