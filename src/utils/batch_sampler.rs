use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Hands out a fixed item sequence in randomly ordered batches.
///
/// The permutation is drawn once at construction and again on every
/// [`reset`](BatchSampler::reset). Once the cursor reaches the end,
/// `next_batch` keeps returning an empty batch.
///
/// One sampler belongs to one exam assembly; the cursor is not synchronised.
#[derive(Debug)]
pub struct BatchSampler<T, R = StdRng> {
    items: Vec<T>,
    order: Vec<usize>,
    batch_size: usize,
    cursor: usize,
    rng: R,
}

impl<T> BatchSampler<T, StdRng> {
    pub fn new(items: Vec<T>, batch_size: usize) -> Self {
        Self::with_rng(items, batch_size, StdRng::from_entropy())
    }
}

impl<T, R: Rng> BatchSampler<T, R> {
    /// Panics if `batch_size` is zero.
    pub fn with_rng(items: Vec<T>, batch_size: usize, rng: R) -> Self {
        assert!(batch_size > 0, "batch size must be positive");
        let mut sampler = Self {
            order: (0..items.len()).collect(),
            items,
            batch_size,
            cursor: 0,
            rng,
        };
        sampler.shuffle();
        sampler
    }

    // Fisher-Yates, last to first, partner drawn from [0, i].
    fn shuffle(&mut self) {
        for i in (1..self.order.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            self.order.swap(i, j);
        }
    }

    pub fn next_batch(&mut self) -> Vec<&T> {
        if self.cursor >= self.items.len() {
            return Vec::new();
        }
        let end = (self.cursor + self.batch_size).min(self.items.len());
        let batch = self.order[self.cursor..end]
            .iter()
            .map(|&idx| &self.items[idx])
            .collect();
        self.cursor = end;
        batch
    }

    /// Takes effect from the next call to `next_batch`.
    pub fn set_batch_size(&mut self, batch_size: usize) {
        assert!(batch_size > 0, "batch size must be positive");
        self.batch_size = batch_size;
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
        self.shuffle();
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.cursor
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<R: Rng>(sampler: &mut BatchSampler<u32, R>) -> Vec<u32> {
        let mut seen = Vec::new();
        loop {
            let batch: Vec<u32> = sampler.next_batch().into_iter().copied().collect();
            if batch.is_empty() {
                break;
            }
            assert!(batch.len() <= sampler.batch_size());
            seen.extend(batch);
        }
        seen
    }

    #[test]
    fn drains_every_item_exactly_once() {
        for n in 0..20u32 {
            for b in 1..8usize {
                let items: Vec<u32> = (0..n).collect();
                let mut sampler = BatchSampler::new(items.clone(), b);
                let mut seen = drain(&mut sampler);
                seen.sort_unstable();
                assert_eq!(seen, items, "n={} b={}", n, b);
                assert!(sampler.next_batch().is_empty());
                assert_eq!(sampler.remaining(), 0);
            }
        }
    }

    #[test]
    fn batches_are_full_until_the_tail() {
        let mut sampler = BatchSampler::new((0..12u32).collect(), 5);
        assert_eq!(sampler.next_batch().len(), 5);
        assert_eq!(sampler.next_batch().len(), 5);
        assert_eq!(sampler.next_batch().len(), 2);
        assert!(sampler.next_batch().is_empty());
    }

    #[test]
    fn reset_rewinds_and_yields_same_multiset() {
        let items: Vec<u32> = (0..17).collect();
        let mut sampler = BatchSampler::new(items.clone(), 4);
        let mut first = drain(&mut sampler);
        sampler.reset();
        assert_eq!(sampler.remaining(), items.len());
        let mut second = drain(&mut sampler);
        first.sort_unstable();
        second.sort_unstable();
        assert_eq!(first, items);
        assert_eq!(second, items);
    }

    #[test]
    fn batch_size_change_applies_to_later_calls() {
        let mut sampler = BatchSampler::new((0..10u32).collect(), 2);
        assert_eq!(sampler.next_batch().len(), 2);
        sampler.set_batch_size(6);
        assert_eq!(sampler.next_batch().len(), 6);
        assert_eq!(sampler.next_batch().len(), 2);
        assert!(sampler.next_batch().is_empty());
    }

    #[test]
    fn duplicate_items_are_kept() {
        let items = vec![7u32, 7, 7, 1];
        let mut sampler = BatchSampler::with_rng(items.clone(), 3, StdRng::seed_from_u64(9));
        let mut seen = drain(&mut sampler);
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 7, 7, 7]);
    }

    #[test]
    #[should_panic(expected = "batch size must be positive")]
    fn zero_batch_size_is_rejected() {
        let _ = BatchSampler::new(vec![1u32], 0);
    }
}
