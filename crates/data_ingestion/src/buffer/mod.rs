//! src/buffer/mod.rs
//!
//! This module implements the `SampleBuffer`.
//!
//! The `SampleBuffer` is a fixed-capacity, self-refilling pool of samples. A
//! single producer thread draws samples out of it, and any number of consumer
//! threads hand them back once downstream stages are done with the bytes.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────┐
//!                  │ SampleSource │ (InMemory, Files, Lines, ...)
//!                  └──────┬───────┘
//!                         │ read_sample() into recycled storage
//!                         ↓
//!   ┌─────────────────────────────────────────────┐
//!   │ SampleBuffer (producer thread, &mut self)   │
//!   │                                             │
//!   │   ActiveSet ──ShuffleEngine picks──→ caller │
//!   │      ↑                                      │
//!   │      └── refill ── RecyclePool (Mutex) ←────┼── Recycler::recycle()
//!   └─────────────────────────────────────────────┘     (any thread)
//! ```
//!
//! Every sample is in exactly one place at a time: the active set, the
//! recycle pool, or a consumer's hands. The slot count is fixed at warm-up,
//! so memory use is bounded by
//! `(active_size + 2 * batch_size) * initial_bytes`.
//!
//! # Module Structure
//!
//! ```text
//! src/buffer/
//! ├── mod.rs         # Public API exports + module-level architecture docs
//! ├── config.rs      # SampleBufferConfig, builder, and validation
//! ├── loader.rs      # SampleBuffer: warm-up, get_next, refill
//! ├── active.rs      # ActiveSet with O(1) swap-remove eviction
//! ├── recycle.rs     # RecyclePool and the Recycler handle
//! └── shuffle.rs     # Seeded ShuffleEngine
//! ```
//!
//! # Example Usage
//!
//! ```ignore
//! let config = SampleBufferConfig::builder()
//!     .shuffle(true)
//!     .initial_fill(1024)
//!     .batch_size(32)
//!     .seed(42)
//!     .shard(rank, world_size)
//!     .build();
//!
//! let mut buffer = SampleBuffer::new(config, |shard| FileSource::from_dir(dir, &["jpg"], true, shard))?;
//! let recycler = buffer.recycler();
//!
//! let batch = buffer.get_batch(32)?;
//! // ... decode / augment on worker threads ...
//! recycler.recycle_all(batch);
//! ```

mod active;
mod config;
mod loader;
mod recycle;
mod shuffle;

pub use config::{SampleBufferConfig, SampleBufferConfigBuilder};
pub use loader::{BufferState, SampleBuffer};
pub use recycle::Recycler;
