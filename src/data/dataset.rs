use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::discover::FilePairs;
use super::sample::{load_sample, ImageF32, MaskF32, Sample, SampleOptions};
use crate::error::{DataError, Result};

// ---------------------------------------------------------------------------
// Dataset – finite, indexable, restartable
// ---------------------------------------------------------------------------

/// A finite sequence of items produced on demand.
///
/// `get` does the work (decode, transform, ...) for one element, so walking
/// a dataset never needs more than one item in memory at a time.
pub trait Dataset {
    type Item;

    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Result<Self::Item>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate from the start. Each call starts a fresh pass.
    fn iter(&self) -> DatasetIter<'_, Self>
    where
        Self: Sized,
    {
        DatasetIter {
            dataset: self,
            next: 0,
        }
    }

    /// Produce every item up front.
    fn materialize(&self) -> Result<Vec<Self::Item>>
    where
        Self: Sized,
    {
        self.iter().collect()
    }
}

pub struct DatasetIter<'a, D> {
    dataset: &'a D,
    next: usize,
}

impl<D: Dataset> Iterator for DatasetIter<'_, D> {
    type Item = Result<D::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.dataset.len() {
            return None;
        }
        let item = self.dataset.get(self.next);
        self.next += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.dataset.len().saturating_sub(self.next);
        (left, Some(left))
    }
}

/// Items already in memory. Test fixtures only: a `Dataset` impl on `Vec`
/// itself would shadow the slice `get` and `iter` wherever the trait is in
/// scope.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct InMemory<T>(pub Vec<T>);

#[cfg(test)]
impl<T: Clone> Dataset for InMemory<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.0.len()
    }

    fn get(&self, index: usize) -> Result<T> {
        self.0.get(index).cloned().ok_or(DataError::IndexOutOfRange {
            index,
            len: self.0.len(),
        })
    }
}

impl<D: Dataset> Dataset for Arc<D> {
    type Item = D::Item;

    fn len(&self) -> usize {
        self.as_ref().len()
    }

    fn get(&self, index: usize) -> Result<D::Item> {
        self.as_ref().get(index)
    }
}

// ---------------------------------------------------------------------------
// PairedDataset – decodes FilePairs lazily
// ---------------------------------------------------------------------------

/// Image/mask pairs read from disk one at a time.
#[derive(Debug, Clone)]
pub struct PairedDataset {
    pairs: FilePairs,
    options: SampleOptions,
}

impl PairedDataset {
    /// Build over `pairs`, keeping at most `desired_amount` of them.
    pub fn new(pairs: &FilePairs, options: SampleOptions, desired_amount: Option<usize>) -> Self {
        let pairs = match desired_amount {
            Some(amount) => pairs.truncated(amount),
            None => pairs.clone(),
        };
        Self { pairs, options }
    }

    pub fn pairs(&self) -> &FilePairs {
        &self.pairs
    }

    pub fn options(&self) -> SampleOptions {
        self.options
    }
}

impl Dataset for PairedDataset {
    type Item = Sample;

    fn len(&self) -> usize {
        self.pairs.len()
    }

    fn get(&self, index: usize) -> Result<Sample> {
        let pair = self.pairs.get(index).ok_or(DataError::IndexOutOfRange {
            index,
            len: self.len(),
        })?;
        log::debug!("decoding {}", pair.image.display());
        load_sample(&pair, self.options)
    }
}

// ---------------------------------------------------------------------------
// Subset + train/validation split
// ---------------------------------------------------------------------------

/// A view selecting `indices` of a shared base dataset, in that order.
#[derive(Debug, Clone)]
pub struct Subset<D> {
    base: Arc<D>,
    indices: Vec<usize>,
}

impl<D: Dataset> Subset<D> {
    pub fn new(base: Arc<D>, indices: Vec<usize>) -> Self {
        Self { base, indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }
}

impl<D: Dataset> Dataset for Subset<D> {
    type Item = D::Item;

    fn len(&self) -> usize {
        self.indices.len()
    }

    fn get(&self, index: usize) -> Result<D::Item> {
        let &base_index = self.indices.get(index).ok_or(DataError::IndexOutOfRange {
            index,
            len: self.indices.len(),
        })?;
        self.base.get(base_index)
    }
}

/// Number of validation items for `len` items: `ceil(len * fraction)`,
/// capped at `len`.
pub fn validation_len(len: usize, val_fraction: f64) -> usize {
    let fraction = val_fraction.clamp(0.0, 1.0);
    ((len as f64 * fraction).ceil() as usize).min(len)
}

/// Randomly partition `dataset` into `(train, validation)`.
///
/// The permutation is drawn from `seed`, so the same input and seed always
/// give the same split.
pub fn train_val_split<D: Dataset>(
    dataset: D,
    val_fraction: f64,
    seed: u64,
) -> (Subset<D>, Subset<D>) {
    let len = dataset.len();
    let mut order: Vec<usize> = (0..len).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    order.shuffle(&mut rng);

    let train = order.split_off(validation_len(len, val_fraction));
    let base = Arc::new(dataset);
    log::info!("{} in train | {} in val", train.len(), order.len());
    (Subset::new(Arc::clone(&base), train), Subset::new(base, order))
}

// ---------------------------------------------------------------------------
// Evaluation views
// ---------------------------------------------------------------------------

/// Only the image of each pair.
#[derive(Debug, Clone)]
pub struct ImagesOnly<D>(pub D);

impl<D: Dataset<Item = Sample>> Dataset for ImagesOnly<D> {
    type Item = ImageF32;

    fn len(&self) -> usize {
        self.0.len()
    }

    fn get(&self, index: usize) -> Result<ImageF32> {
        Ok(self.0.get(index)?.image)
    }
}

/// Only the mask of each pair.
#[derive(Debug, Clone)]
pub struct MasksOnly<D>(pub D);

impl<D: Dataset<Item = Sample>> Dataset for MasksOnly<D> {
    type Item = MaskF32;

    fn len(&self) -> usize {
        self.0.len()
    }

    fn get(&self, index: usize) -> Result<MaskF32> {
        Ok(self.0.get(index)?.mask)
    }
}

/// Unsplit datasets for evaluating a trained model.
pub struct EvalDatasets<D> {
    pub combined: Arc<D>,
    pub images: ImagesOnly<Arc<D>>,
    pub masks: MasksOnly<Arc<D>>,
}

impl<D: Dataset<Item = Sample>> EvalDatasets<D> {
    pub fn new(dataset: D) -> Self {
        let combined = Arc::new(dataset);
        log::info!("{} loaded", combined.len());
        Self {
            images: ImagesOnly(Arc::clone(&combined)),
            masks: MasksOnly(Arc::clone(&combined)),
            combined,
        }
    }
}
