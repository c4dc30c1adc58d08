//! src/buffer/loader.rs
//!
//! `SampleBuffer`: lazy warm-up, dispensing and refill-on-read.
//!
//! # Refill-on-read
//! Every `get_next` immediately replaces the dispensed sample with a freshly
//! sourced one, so the active set stays at a constant size and the cost of
//! sourcing overlaps with whatever the caller does with the returned sample.
//!
//! # Failure policy
//! - Recycle pool empty: `ProtocolViolation`, nothing is moved.
//! - Refill read fails: the acquired empty sample goes back to the recycle
//!   pool and the selected sample goes back into the active set before the
//!   error is returned. No slot is lost and the buffer remains usable.
//! - Warm-up read fails: samples filled so far stay in the active set and the
//!   buffer stays uninitialized; the next `get_next` resumes filling where
//!   the failed attempt stopped, so no sourced item is skipped.
//! - A batch fails part-way: the samples already dispensed are handed back
//!   inside `BufferError::Interrupted` instead of being recycled.

use crate::buffer::active::ActiveSet;
use crate::buffer::config::SampleBufferConfig;
use crate::buffer::recycle::{RecyclePool, Recycler};
use crate::buffer::shuffle::ShuffleEngine;
use crate::error::{BufferError, Result};
use crate::sample::Sample;
use crate::source::{SampleSource, Shard};
use rand::Rng;
use std::sync::Arc;
use tracing::{debug, debug_span, info, warn};

/// Lifecycle of a `SampleBuffer`.
///
/// `Released` is not represented: teardown happens when the buffer is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// No storage allocated yet.
    Uninitialized,
    /// All slots allocated; dispensing.
    Warm,
}

/// Fixed-capacity, self-refilling supply of samples.
///
/// # Thread safety
/// - `get_next` takes `&mut self`: exactly one producer thread dispenses.
///   The active set has no lock because the borrow checker already rules
///   out a second producer.
/// - `return_sample` takes `&self`, and `recycler()` hands out `Send + Sync`
///   handles, so any number of consumer threads can return samples while the
///   producer keeps dispensing.
///
/// # Type parameters
/// - `S`: The `SampleSource` strategy, chosen at construction.
///
/// # Example
/// ```ignore
/// let config = SampleBufferConfig::builder()
///     .shuffle(true)
///     .initial_fill(256)
///     .batch_size(32)
///     .seed(42)
///     .build();
/// let mut buffer = SampleBuffer::new(config, |shard| InMemorySource::new(records, shard))?;
///
/// let sample = buffer.get_next()?;
/// // ... hand the bytes downstream ...
/// buffer.return_sample(sample);
/// ```
pub struct SampleBuffer<S: SampleSource> {
    config: SampleBufferConfig,
    seed: u64,
    source: S,
    active: ActiveSet,
    pool: Arc<RecyclePool>,
    shuffle: Option<ShuffleEngine>,
    state: BufferState,
}

impl<S: SampleSource> SampleBuffer<S> {
    /// Creates a buffer. No storage is allocated until the first `get_next`.
    ///
    /// The configuration is validated first; on failure `open` is never
    /// called. `open` receives the configured shard unchanged and builds the
    /// source for it.
    pub fn new<F>(config: SampleBufferConfig, open: F) -> Result<Self>
    where
        F: FnOnce(Shard) -> anyhow::Result<S>,
    {
        config.validate()?;

        let source = open(config.shard()).map_err(BufferError::data_source)?;

        let seed = match config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::rng().random::<u64>();
                info!(seed, "No seed configured for sample buffer, drew one");
                seed
            }
        };
        let shuffle = config
            .shuffle
            .then(|| ShuffleEngine::new(seed, config.active_size()));

        debug!(
            shuffle = config.shuffle,
            active_size = config.active_size(),
            recycle_size = config.recycle_size(),
            shard_index = config.shard_index,
            shard_count = config.shard_count,
            source_size = source.size(),
            "Created sample buffer"
        );

        Ok(Self {
            active: ActiveSet::default(),
            config,
            seed,
            source,
            pool: Arc::new(RecyclePool::default()),
            shuffle,
            state: BufferState::Uninitialized,
        })
    }

    /// Dispenses the next sample, transferring its ownership to the caller.
    ///
    /// The first call warms the buffer up. With shuffling enabled the sample
    /// is chosen at random from the active set; otherwise samples come out in
    /// source order.
    ///
    /// # Errors
    /// - `ProtocolViolation` if the recycle pool is empty.
    /// - `DataSource` if the source fails to produce the replacement sample.
    pub fn get_next(&mut self) -> Result<Sample> {
        if self.state == BufferState::Uninitialized {
            self.warm_up()?;
        }

        let live = self.active.len();
        let index = match self.shuffle.as_mut() {
            Some(engine) => engine.pick(live),
            None => 0,
        };

        // Grab the replacement before evicting so an empty pool leaves the
        // active set untouched.
        let Some(mut refill) = self.pool.acquire() else {
            let checked_out = self.checked_out();
            warn!(checked_out, "Recycle pool exhausted");
            return Err(BufferError::ProtocolViolation { checked_out });
        };

        let selected = self.active.take(index);

        if let Err(e) = self.source.read_sample(&mut refill) {
            warn!(error = %e, "Refill failed; restoring buffer slots");
            self.pool.push(refill);
            self.active.push(selected);
            return Err(BufferError::data_source(e));
        }
        self.active.push(refill);

        Ok(selected)
    }

    /// Dispenses `n` samples in sequence.
    ///
    /// # Errors
    /// If the first `get_next` fails, its error is returned as is. A failure
    /// after that returns `Interrupted`, carrying the samples dispensed so far
    /// in order; they are checked out to the caller like any other sample.
    pub fn get_batch(&mut self, n: usize) -> Result<Vec<Sample>> {
        let mut batch = Vec::with_capacity(n);
        for _ in 0..n {
            match self.get_next() {
                Ok(sample) => batch.push(sample),
                Err(e) if batch.is_empty() => return Err(e),
                Err(e) => {
                    debug!(dispensed = batch.len(), requested = n, "Batch interrupted");
                    return Err(BufferError::Interrupted {
                        dispensed: batch,
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(batch)
    }

    /// Returns a previously dispensed sample to the recycle pool.
    pub fn return_sample(&self, sample: Sample) {
        self.pool.push(sample);
    }

    /// Handle for returning samples from other threads.
    pub fn recycler(&self) -> Recycler {
        Recycler::new(Arc::clone(&self.pool))
    }

    pub fn state(&self) -> BufferState {
        self.state
    }

    pub fn config(&self) -> &SampleBufferConfig {
        &self.config
    }

    /// The seed the shuffle engine was built from (drawn if none was configured).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of items visible to this buffer's shard.
    pub fn source_size(&self) -> usize {
        self.source.size()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn recycled_len(&self) -> usize {
        self.pool.len()
    }

    /// Number of slots allocated; zero until warm-up.
    pub fn total_slots(&self) -> usize {
        match self.state {
            BufferState::Uninitialized => 0,
            BufferState::Warm => self.config.total_slots(),
        }
    }

    /// Samples currently held by consumers.
    pub fn checked_out(&self) -> usize {
        self.total_slots()
            .saturating_sub(self.active.len() + self.pool.len())
    }

    /// Fills the active set, then allocates the recycle pool.
    ///
    /// Resumes from a partially filled active set left by a failed attempt.
    fn warm_up(&mut self) -> Result<()> {
        let _span = debug_span!(
            "sample_buffer_warm_up",
            active_size = self.config.active_size(),
            recycle_size = self.config.recycle_size()
        )
        .entered();

        let backend = self.config.backend;
        let initial_bytes = self.config.initial_bytes;
        let active_size = self.config.active_size();

        self.active
            .try_reserve(active_size.saturating_sub(self.active.len()))
            .map_err(|e| {
                BufferError::configuration(format!(
                    "cannot reserve an active set of {active_size} samples: {e}"
                ))
            })?;

        while self.active.len() < active_size {
            let mut sample = Sample::with_capacity(backend, initial_bytes);
            if let Err(e) = self.source.read_sample(&mut sample) {
                warn!(
                    error = %e,
                    filled = self.active.len(),
                    active_size,
                    "Warm-up failed; buffer stays uninitialized"
                );
                return Err(BufferError::data_source(e));
            }
            self.active.push(sample);
        }

        let empties = (0..self.config.recycle_size())
            .map(|_| Sample::with_capacity(backend, initial_bytes))
            .collect();
        self.pool.warm(empties);

        self.state = BufferState::Warm;
        debug!(total_slots = self.config.total_slots(), "Sample buffer warm");
        Ok(())
    }
}

impl<S: SampleSource> Drop for SampleBuffer<S> {
    fn drop(&mut self) {
        let checked_out = self.checked_out();
        let freed = self.active.release() + self.pool.release();
        debug!(freed, checked_out, "Released sample buffer");
    }
}
