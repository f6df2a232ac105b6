use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::dataset::Dataset;
use crate::error::Result;

// ---------------------------------------------------------------------------
// Shuffle buffer ordering
// ---------------------------------------------------------------------------

/// Visit order of `len` items through a bounded shuffle buffer.
///
/// The buffer starts with the first `buffer` items; each step emits a random
/// buffered item and refills the slot with the next unread one. A buffer at
/// least as large as `len` gives a uniform shuffle, a buffer of 1 keeps the
/// original order.
pub fn shuffle_buffer_order(len: usize, buffer: usize, rng: &mut impl Rng) -> Vec<usize> {
    let buffer = buffer.max(1);
    let mut pending: Vec<usize> = (0..len.min(buffer)).collect();
    let mut next = pending.len();
    let mut order = Vec::with_capacity(len);

    while !pending.is_empty() {
        let slot = rng.gen_range(0..pending.len());
        order.push(pending[slot]);
        if next < len {
            pending[slot] = next;
            next += 1;
        } else {
            pending.swap_remove(slot);
        }
    }
    order
}

// ---------------------------------------------------------------------------
// BatchLoader
// ---------------------------------------------------------------------------

/// Groups a dataset into mini-batches, optionally reshuffled every epoch.
#[derive(Debug, Clone)]
pub struct BatchLoader<D> {
    dataset: D,
    batch_size: usize,
    shuffle: Option<Shuffle>,
}

#[derive(Debug, Clone, Copy)]
struct Shuffle {
    buffer: usize,
    seed: u64,
}

impl<D: Dataset> BatchLoader<D> {
    pub fn new(dataset: D, batch_size: usize) -> Self {
        Self {
            dataset,
            batch_size: batch_size.max(1),
            shuffle: None,
        }
    }

    /// Reorder through a shuffle buffer of `buffer` items. Epoch `e` uses
    /// `seed + e`, so every epoch differs and every run repeats.
    pub fn shuffled(mut self, buffer: usize, seed: u64) -> Self {
        self.shuffle = Some(Shuffle { buffer, seed });
        self
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Batches per epoch, counting a trailing partial batch.
    pub fn num_batches(&self) -> usize {
        self.dataset.len().div_ceil(self.batch_size)
    }

    pub fn epoch(&self, epoch: u64) -> Batches<'_, D> {
        let len = self.dataset.len();
        let order = match self.shuffle {
            Some(Shuffle { buffer, seed }) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(epoch));
                shuffle_buffer_order(len, buffer, &mut rng)
            }
            None => (0..len).collect(),
        };
        Batches {
            dataset: &self.dataset,
            order,
            batch_size: self.batch_size,
            position: 0,
        }
    }
}

/// One epoch of batches. A failing item fails its whole batch.
pub struct Batches<'a, D> {
    dataset: &'a D,
    order: Vec<usize>,
    batch_size: usize,
    position: usize,
}

impl<D: Dataset> Batches<'_, D> {
    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

impl<D: Dataset> Iterator for Batches<'_, D> {
    type Item = Result<Vec<D::Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.order.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.order.len());
        let batch = self.order[self.position..end]
            .iter()
            .map(|&i| self.dataset.get(i))
            .collect();
        self.position = end;
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::InMemory;

    fn numbers(n: u32) -> InMemory<u32> {
        InMemory((0..n).collect())
    }

    #[test]
    fn batches_keep_partial_tail() {
        let loader = BatchLoader::new(numbers(10), 4);
        assert_eq!(loader.num_batches(), 3);
        let batches: Vec<Vec<u32>> = loader.epoch(0).map(|b| b.unwrap()).collect();
        assert_eq!(batches, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7], vec![8, 9]]);
    }

    #[test]
    fn zero_batch_size_is_bumped_to_one() {
        let loader = BatchLoader::new(InMemory(vec![1u8, 2]), 0);
        assert_eq!(loader.batch_size(), 1);
        assert_eq!(loader.epoch(0).count(), 2);
    }

    #[test]
    fn shuffled_epoch_is_a_permutation() {
        let loader = BatchLoader::new(numbers(100), 32).shuffled(1000, 0);
        let mut seen: Vec<u32> = loader.epoch(0).flat_map(|b| b.unwrap()).collect();
        assert_ne!(seen, (0..100).collect::<Vec<_>>());
        seen.sort();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_repeats_per_seed_and_varies_per_epoch() {
        let loader = BatchLoader::new(numbers(50), 8).shuffled(20, 3);
        assert_eq!(loader.epoch(0).order(), loader.epoch(0).order());
        assert_ne!(loader.epoch(0).order(), loader.epoch(1).order());
    }

    #[test]
    fn unit_buffer_keeps_order() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        assert_eq!(shuffle_buffer_order(6, 1, &mut rng), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn small_buffer_bounds_displacement() {
        // An item can only leave once it has entered the buffer.
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let order = shuffle_buffer_order(200, 5, &mut rng);
        for (pos, &item) in order.iter().enumerate() {
            assert!(item <= pos + 4, "item {item} emitted at {pos}");
        }
    }

    #[test]
    fn empty_dataset_has_no_batches() {
        let loader = BatchLoader::new(InMemory(Vec::<u8>::new()), 4).shuffled(10, 0);
        assert_eq!(loader.num_batches(), 0);
        assert!(loader.epoch(0).next().is_none());
    }
}
