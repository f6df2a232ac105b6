use std::path::{Path, PathBuf};

use super::dataset::{train_val_split, EvalDatasets, PairedDataset, Subset};
use super::discover::{discover_pairs, FilePairs, PairingRule};
use super::sample::SampleOptions;
use crate::error::Result;

// ---------------------------------------------------------------------------
// DataReader – one image root, one mask root, discovered once
// ---------------------------------------------------------------------------

/// Entry point tying discovery to dataset assembly for one pair of roots.
///
/// Discovery runs on first use and its result is kept for the lifetime of
/// the reader.
#[derive(Debug, Clone)]
pub struct DataReader {
    images_root: PathBuf,
    masks_root: PathBuf,
    rule: PairingRule,
    pairs: Option<FilePairs>,
}

impl DataReader {
    pub fn new(images_root: impl Into<PathBuf>, masks_root: impl Into<PathBuf>) -> Self {
        Self {
            images_root: images_root.into(),
            masks_root: masks_root.into(),
            rule: PairingRule::default(),
            pairs: None,
        }
    }

    pub fn with_rule(mut self, rule: PairingRule) -> Self {
        self.rule = rule;
        self.pairs = None;
        self
    }

    pub fn images_root(&self) -> &Path {
        &self.images_root
    }

    pub fn masks_root(&self) -> &Path {
        &self.masks_root
    }

    /// Discovered pairs, walking the roots only the first time.
    pub fn file_pairs(&mut self) -> Result<&FilePairs> {
        let pairs = match self.pairs.take() {
            Some(pairs) => pairs,
            None => discover_pairs(&self.images_root, &self.masks_root, &self.rule)?,
        };
        let pairs: &FilePairs = self.pairs.insert(pairs);
        Ok(pairs)
    }

    /// Lazy dataset over (at most `desired_amount` of) the discovered pairs.
    pub fn dataset(
        &mut self,
        options: SampleOptions,
        desired_amount: Option<usize>,
    ) -> Result<PairedDataset> {
        let pairs = self.file_pairs()?;
        Ok(PairedDataset::new(pairs, options, desired_amount))
    }

    /// Training mode: random `(train, validation)` partition.
    pub fn train_val(
        &mut self,
        options: SampleOptions,
        desired_amount: Option<usize>,
        val_fraction: f64,
        seed: u64,
    ) -> Result<(Subset<PairedDataset>, Subset<PairedDataset>)> {
        let dataset = self.dataset(options, desired_amount)?;
        Ok(train_val_split(dataset, val_fraction, seed))
    }

    /// Evaluation mode: everything, unsplit, plus image-only and mask-only
    /// views.
    pub fn evaluation(
        &mut self,
        options: SampleOptions,
        desired_amount: Option<usize>,
    ) -> Result<EvalDatasets<PairedDataset>> {
        let dataset = self.dataset(options, desired_amount)?;
        Ok(EvalDatasets::new(dataset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::Dataset;
    use crate::data::sample::tests::{write_mask, write_rgb};
    use crate::error::DataError;
    use tempfile::TempDir;

    fn tree(n: usize) -> (TempDir, DataReader) {
        let dir = TempDir::new().unwrap();
        let images = dir.path().join("images");
        let masks = dir.path().join("targets");
        for i in 0..n {
            write_rgb(&images.join(format!("{i:02}_pre_disaster.png")), 6, 6);
            write_rgb(&images.join(format!("{i:02}_post_disaster.png")), 6, 6);
            write_mask(&masks.join(format!("{i:02}_pre_disaster_target.png")), 6, 6);
        }
        let reader = DataReader::new(images, masks);
        (dir, reader)
    }

    #[test]
    fn discovery_is_cached() {
        let (dir, mut reader) = tree(3);
        assert_eq!(reader.file_pairs().unwrap().len(), 3);

        // New files after the first call are not picked up.
        write_rgb(&dir.path().join("images/99_pre_disaster.png"), 6, 6);
        assert_eq!(reader.file_pairs().unwrap().len(), 3);

        let mut fresh = DataReader::new(reader.images_root(), reader.masks_root());
        assert!(matches!(
            fresh.file_pairs(),
            Err(DataError::PairCountMismatch { images: 4, masks: 3 })
        ));
    }

    #[test]
    fn training_mode_splits_resized_samples() {
        let (_dir, mut reader) = tree(5);
        let options = SampleOptions {
            target_size: Some((4, 4)),
        };
        let (train, val) = reader.train_val(options, None, 0.2, 0).unwrap();
        assert_eq!(train.len(), 4);
        assert_eq!(val.len(), 1);

        let sample = val.get(0).unwrap();
        assert_eq!(sample.image.dimensions(), (4, 4));
        assert_eq!(sample.mask.dimensions(), (4, 4));
    }

    #[test]
    fn evaluation_mode_keeps_everything() {
        let (_dir, mut reader) = tree(4);
        let eval = reader.evaluation(SampleOptions::default(), Some(3)).unwrap();
        assert_eq!(eval.combined.len(), 3);
        assert_eq!(eval.images.get(2).unwrap().dimensions(), (6, 6));
        assert_eq!(eval.masks.get(2).unwrap().dimensions(), (6, 6));
    }
}
