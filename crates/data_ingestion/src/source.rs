use crate::sample::Sample;
use anyhow::{ensure, Result};

/// A `SampleSource` produces the logical items of one shard into
/// caller-supplied storage.
///
/// The `SampleBuffer` owns exactly one source, chosen at construction, and
/// calls it from the single producer thread only.
///
/// # Methods
/// - `read_sample(sample)`: overwrites `sample` with the next item of this
///   shard's stream and advances the source's cursor. Errors are propagated
///   to the `get_next` caller unchanged; any retry policy belongs here.
/// - `size()`: total number of logical items visible to this shard.
///
/// Implementations must be `Send` so a buffer can be moved onto a dedicated
/// producer thread (see `BatchPrefetcher`).
pub trait SampleSource: Send {
    fn read_sample(&mut self, sample: &mut Sample) -> Result<()>;

    fn size(&self) -> usize;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read_sample(&mut self, sample: &mut Sample) -> Result<()> {
        (**self).read_sample(sample)
    }

    fn size(&self) -> usize {
        (**self).size()
    }
}

/// Identifies the slice of a global dataset this buffer instance consumes.
///
/// The buffer forwards it verbatim to the source factory; only sources
/// interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shard {
    pub index: usize,
    pub count: usize,
}

impl Default for Shard {
    fn default() -> Self {
        Self { index: 0, count: 1 }
    }
}

impl Shard {
    pub fn new(index: usize, count: usize) -> Self {
        Self { index, count }
    }

    /// Number of items each shard receives for a dataset of `total` items.
    ///
    /// The dataset is padded up to the smallest multiple of `count`, so every
    /// shard gets the same number of items.
    /// - Example: `total = 10`, `count = 3` → every shard gets `4`.
    pub fn items_per_shard(&self, total: usize) -> usize {
        total.div_ceil(self.count.max(1))
    }

    /// Global item indices owned by this shard, in stream order.
    ///
    /// Shard `i` takes every `count`th index starting at `i`. Indices past the
    /// end wrap around to the front, which keeps shard sizes equal:
    /// ```text
    /// total = 10, count = 3
    ///   Shard 0: [0, 3, 6, 9]
    ///   Shard 1: [1, 4, 7, 0]  // padded with index 0
    ///   Shard 2: [2, 5, 8, 1]  // padded with index 1
    /// ```
    pub fn partition(&self, total: usize) -> Result<Vec<usize>> {
        ensure!(total > 0, "Cannot shard an empty dataset");
        ensure!(self.count > 0, "Shard count must be > 0");
        ensure!(
            self.index < self.count,
            "Invalid shard index {}, it should be in the interval [0, {}]",
            self.index,
            self.count - 1
        );

        let padded = self.items_per_shard(total) * self.count;
        Ok((0..padded)
            .skip(self.index)
            .step_by(self.count)
            .map(|i| i % total)
            .collect())
    }
}
