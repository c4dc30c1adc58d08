//! Concurrency-safe pool of empty sample storage.
//!
//! Consumers push samples back from any thread; the single producer pops one
//! per refill. One `parking_lot::Mutex` covers both operations: each is O(1),
//! so the critical sections are a handful of instructions long.

use crate::sample::Sample;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Debug, Default)]
pub(crate) struct RecyclePool {
    slots: Mutex<PoolSlots>,
}

#[derive(Debug, Default)]
struct PoolSlots {
    samples: Vec<Sample>,
    /// Maximum number of samples the pool may hold. Zero before warm-up and
    /// after release, so stray pushes are dropped instead of growing the pool.
    capacity: usize,
}

impl RecyclePool {
    /// Installs the warm-up samples and fixes the pool capacity to their count.
    pub(crate) fn warm(&self, samples: Vec<Sample>) {
        let mut slots = self.slots.lock();
        slots.capacity = samples.len();
        slots.samples = samples;
    }

    /// Pushes a sample back. The sample's item is cleared, its storage kept.
    pub(crate) fn push(&self, mut sample: Sample) {
        sample.reset();
        let mut slots = self.slots.lock();
        if slots.samples.len() < slots.capacity {
            slots.samples.push(sample);
            return;
        }
        let capacity = slots.capacity;
        drop(slots);

        if capacity == 0 {
            debug!("Recycle pool is not live; dropping returned sample");
        } else {
            warn!(
                capacity,
                "Recycle pool is full; dropping a sample that was not dispensed by this buffer"
            );
        }
    }

    /// Pops one empty sample, or `None` if every slot is checked out or active.
    pub(crate) fn acquire(&self) -> Option<Sample> {
        self.slots.lock().samples.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.lock().samples.len()
    }

    /// Frees every pooled sample and closes the pool to further pushes.
    pub(crate) fn release(&self) -> usize {
        let mut slots = self.slots.lock();
        slots.capacity = 0;
        let freed = slots.samples.len();
        slots.samples = Vec::new();
        freed
    }
}

/// Cloneable handle for returning samples to a buffer's recycle pool.
///
/// A `Recycler` is `Send + Sync` and can be handed to any number of consumer
/// threads. It stays valid after the buffer is dropped; samples returned then
/// are simply freed.
///
/// # Example
/// ```ignore
/// let recycler = buffer.recycler();
/// let sample = buffer.get_next()?;
/// std::thread::spawn(move || {
///     consume(&sample);
///     recycler.recycle(sample);
/// });
/// ```
#[derive(Debug, Clone)]
pub struct Recycler {
    pool: Arc<RecyclePool>,
}

impl Recycler {
    pub(crate) fn new(pool: Arc<RecyclePool>) -> Self {
        Self { pool }
    }

    /// Returns a previously dispensed sample to the pool.
    pub fn recycle(&self, sample: Sample) {
        self.pool.push(sample);
    }

    /// Returns every sample of a batch to the pool.
    pub fn recycle_all(&self, samples: impl IntoIterator<Item = Sample>) {
        for sample in samples {
            self.pool.push(sample);
        }
    }

    /// Number of empty samples currently available for refills.
    pub fn available(&self) -> usize {
        self.pool.len()
    }
}
