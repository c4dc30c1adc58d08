//! Producer-owned set of samples ready to be dispensed.

use crate::sample::Sample;
use std::collections::TryReserveError;

/// Order-irrelevant collection of filled samples.
///
/// Only the producer thread touches it (it lives behind `&mut SampleBuffer`),
/// so there is no lock. Removal swaps the chosen element with the last one
/// and pops, which is O(1) and does not preserve order.
#[derive(Debug, Default)]
pub(crate) struct ActiveSet {
    samples: Vec<Sample>,
}

impl ActiveSet {
    #[cfg(test)]
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Reserves room for `additional` more samples without panicking on
    /// capacity overflow.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.samples.try_reserve_exact(additional)
    }

    pub(crate) fn len(&self) -> usize {
        self.samples.len()
    }

    pub(crate) fn push(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    /// Removes and returns the sample at `index` by swapping in the last one.
    ///
    /// Panics if `index` is out of bounds; callers reduce their draw modulo
    /// `len()` first.
    pub(crate) fn take(&mut self, index: usize) -> Sample {
        self.samples.swap_remove(index)
    }

    /// Drops every sample, returning how many were freed.
    pub(crate) fn release(&mut self) -> usize {
        let freed = self.samples.len();
        self.samples.clear();
        self.samples.shrink_to_fit();
        freed
    }

    #[cfg(test)]
    pub(crate) fn source_indices(&self) -> Vec<Option<usize>> {
        self.samples.iter().map(Sample::source_index).collect()
    }
}
