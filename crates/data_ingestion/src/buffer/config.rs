//! src/buffer/config.rs
//!
//! Configuration for `SampleBuffer` behaviour
//!
//! The `SampleBufferConfig` struct stores the construction-time parameters of
//! a buffer. It is immutable once the buffer is built.
//!
//! Example:
//! ```ignore
//! let config = SampleBufferConfig::builder()
//!     .shuffle(true)
//!     .initial_fill(1024)
//!     .batch_size(32)
//!     .seed(42)
//!     .shard(rank, world_size)
//!     .build();
//! ```
//!
//! # Memory considerations:
//! - The buffer holds `active_size() + recycle_size()` samples for its whole
//!   lifetime, each pre-sized to `initial_bytes`.
//! - `initial_fill`: Larger values give better mixing but cost more memory
//!   and a longer warm-up.
//! - `batch_size`: Sets the recycle pool to two batches, enough for one batch
//!   in flight downstream while the next one is being assembled.

use crate::error::{BufferError, Result};
use crate::sample::Backend;
use crate::source::Shard;
use serde::Deserialize;

/// Configuration for SampleBuffer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SampleBufferConfig {
    /// Whether to dispense samples in random order (defaults to false, i.e. FIFO)
    pub shuffle: bool,
    /// Number of samples kept ready for random selection.
    /// Only meaningful with `shuffle = true`; the active set holds 1 sample otherwise.
    pub initial_fill: usize,
    /// Downstream batch size. The recycle pool is warmed with `2 * batch_size` samples.
    pub batch_size: usize,
    /// Bytes pre-allocated in every sample to avoid reallocations
    pub initial_bytes: usize,
    /// Random seed for reproducible shuffling. A random seed is drawn if `None`.
    pub seed: Option<u64>,
    /// Index of the shard this buffer reads, forwarded to the source
    pub shard_index: usize,
    /// Total number of shards, forwarded to the source
    pub shard_count: usize,
    /// Backend tag given to every allocated sample
    pub backend: Backend,
}

impl Default for SampleBufferConfig {
    fn default() -> Self {
        Self {
            shuffle: false,
            initial_fill: 1024,
            batch_size: 32,
            initial_bytes: 1 << 20,
            seed: None,
            shard_index: 0,
            shard_count: 1,
            backend: Backend::Host,
        }
    }
}

impl SampleBufferConfig {
    pub fn builder() -> SampleBufferConfigBuilder {
        SampleBufferConfigBuilder::default()
    }

    /// Parses a configuration from JSON. Missing fields take their defaults.
    ///
    /// ```ignore
    /// let config = SampleBufferConfig::from_json_str(
    ///     r#"{"shuffle": true, "initial_fill": 512, "batch_size": 16, "seed": 7}"#,
    /// )?;
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| BufferError::configuration(format!("malformed JSON config: {e}")))
    }

    /// Size of the active set: `initial_fill` when shuffling, 1 otherwise.
    pub fn active_size(&self) -> usize {
        if self.shuffle {
            self.initial_fill
        } else {
            1
        }
    }

    /// Size the recycle pool is warmed to: two batches.
    pub fn recycle_size(&self) -> usize {
        self.batch_size.saturating_mul(2)
    }

    /// Total number of samples the buffer will ever allocate.
    pub fn total_slots(&self) -> usize {
        self.active_size().saturating_add(self.recycle_size())
    }

    pub fn shard(&self) -> Shard {
        Shard::new(self.shard_index, self.shard_count)
    }

    /// Checks the configuration. Called by `SampleBuffer::new` before any
    /// allocation takes place.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(BufferError::configuration(
                "batch_size must be > 0 so the recycle pool is not empty",
            ));
        }
        if self.batch_size.checked_mul(2).is_none() {
            return Err(BufferError::configuration(format!(
                "batch_size {} is too large",
                self.batch_size
            )));
        }
        if self.active_size().checked_add(self.batch_size * 2).is_none() {
            return Err(BufferError::configuration(format!(
                "initial_fill {} plus two batches of {} overflows the slot count",
                self.initial_fill, self.batch_size
            )));
        }
        if self.shuffle && self.initial_fill == 0 {
            return Err(BufferError::configuration(
                "initial_fill must be > 0 when shuffle is enabled",
            ));
        }
        Ok(())
    }
}

/// Builder for SampleBufferConfig with method chaining
#[derive(Default)]
pub struct SampleBufferConfigBuilder {
    config: SampleBufferConfig,
}

impl SampleBufferConfigBuilder {
    /// Set whether samples are dispensed in random order
    pub fn shuffle(mut self, shuffle: bool) -> Self {
        self.config.shuffle = shuffle;
        self
    }

    /// Set the number of samples kept ready for random selection (must be > 0 when shuffling)
    pub fn initial_fill(mut self, fill: usize) -> Self {
        self.config.initial_fill = fill;
        self
    }

    /// Set the downstream batch size (must be > 0)
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set the per-sample byte capacity allocated at warm-up
    pub fn initial_bytes(mut self, bytes: usize) -> Self {
        self.config.initial_bytes = bytes;
        self
    }

    /// Set the random seed for reproducible shuffling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Set the shard this buffer consumes. Forwarded to the source untouched.
    pub fn shard(mut self, index: usize, count: usize) -> Self {
        self.config.shard_index = index;
        self.config.shard_count = count;
        self
    }

    /// Set the backend tag for allocated samples
    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> SampleBufferConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_pool_sizes() {
        let config = SampleBufferConfig::builder()
            .shuffle(true)
            .initial_fill(3)
            .batch_size(2)
            .build();
        assert_eq!(config.active_size(), 3);
        assert_eq!(config.recycle_size(), 4);
        assert_eq!(config.total_slots(), 7);
    }

    #[test]
    fn active_size_is_one_without_shuffle() {
        let config = SampleBufferConfig::builder()
            .shuffle(false)
            .initial_fill(100)
            .build();
        assert_eq!(config.active_size(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_batch_size() {
        let config = SampleBufferConfig::builder().batch_size(0).build();
        assert!(matches!(
            config.validate(),
            Err(BufferError::Configuration { .. })
        ));
    }

    #[test]
    fn rejects_overflowing_batch_size() {
        let config = SampleBufferConfig::builder().batch_size(usize::MAX).build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_overflowing_slot_count() {
        let config = SampleBufferConfig::builder()
            .shuffle(true)
            .initial_fill(usize::MAX)
            .batch_size(1)
            .build();
        assert!(matches!(
            config.validate(),
            Err(BufferError::Configuration { .. })
        ));

        let parsed = SampleBufferConfig::from_json_str(&format!(
            r#"{{"shuffle": true, "initial_fill": {}}}"#,
            usize::MAX
        ));
        assert!(parsed.is_ok_and(|c| c.validate().is_err()));
    }

    #[test]
    fn rejects_empty_active_set_when_shuffling() {
        let config = SampleBufferConfig::builder()
            .shuffle(true)
            .initial_fill(0)
            .build();
        assert!(config.validate().is_err());

        // Without shuffling the fill count is ignored
        let config = SampleBufferConfig::builder()
            .shuffle(false)
            .initial_fill(0)
            .build();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_json_with_defaults() -> Result<()> {
        let config = SampleBufferConfig::from_json_str(
            r#"{"shuffle": true, "initial_fill": 8, "seed": 7, "shard_index": 1, "shard_count": 4, "backend": "device"}"#,
        )?;
        assert!(config.shuffle);
        assert_eq!(config.initial_fill, 8);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.shard(), Shard::new(1, 4));
        assert_eq!(config.backend, Backend::Device);
        assert_eq!(config.batch_size, SampleBufferConfig::default().batch_size);
        Ok(())
    }

    #[test]
    fn rejects_malformed_json() {
        let err = SampleBufferConfig::from_json_str("{\"shuffle\": 3}").unwrap_err();
        assert!(matches!(err, BufferError::Configuration { .. }));
    }
}
