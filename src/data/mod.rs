/// Data layer: discovery, decoding, splitting, augmentation, batching.
///
/// Architecture:
/// ```text
///  images/**/*pre*.png     targets/**/*pre*_target.png
///            │                       │
///            └──────────┬────────────┘
///                       ▼
///                ┌────────────┐
///                │  discover   │  walk + pair by PairingRule → FilePairs
///                └────────────┘
///                       │
///                       ▼
///                ┌────────────┐
///                │  dataset    │  PairedDataset: decode one Sample per get()
///                └────────────┘   train/val Subsets or EvalDatasets
///                       │
///                       ▼
///                ┌────────────┐
///                │  augment    │  originals + 6 transformed copies (7×)
///                └────────────┘
///                       │
///                       ▼
///                ┌────────────┐
///                │  batch      │  shuffle buffer → Vec<Sample> batches
///                └────────────┘
/// ```
///
/// `reader::DataReader` wraps the first two steps for one pair of roots.

pub mod augment;
pub mod batch;
pub mod dataset;
pub mod discover;
pub mod reader;
pub mod sample;
