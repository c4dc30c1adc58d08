pub mod buffer;
pub mod error;
pub mod prefetch;
pub mod readers;
pub mod sample;
pub mod source;

pub use buffer::{BufferState, Recycler, SampleBuffer, SampleBufferConfig};
pub use error::{BufferError, Result};
pub use prefetch::BatchPrefetcher;
pub use readers::{FileSource, InMemorySource, LineSource};
pub use sample::{Backend, Sample};
pub use source::{SampleSource, Shard};
