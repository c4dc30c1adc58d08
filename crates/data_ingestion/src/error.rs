//! Error type for the sample-supply buffer.
//!
//! Every failure class is fatal for the call that raised it:
//! - `Configuration`: rejected at construction, before any storage is allocated.
//! - `ProtocolViolation`: the recycle pool ran dry because consumers kept
//!   samples. Surfaced immediately instead of waiting, since waiting would
//!   hang a pipeline that has a structural bug.
//! - `DataSource`: the `SampleSource` failed; its error is kept as the source.
//! - `Interrupted`: a batch stopped part-way. The samples dispensed before the
//!   failure travel with the error, still holding their items.
//! - `Spawn`: the prefetch thread could not be created.

use crate::sample::Sample;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BufferError {
    /// Construction-time configuration is unusable.
    #[error("Invalid sample buffer configuration: {message}")]
    Configuration { message: String },

    /// Acquire was called against an empty recycle pool.
    #[error(
        "No empty samples left in the recycle pool ({checked_out} checked out) - \
         did you forget to return them?"
    )]
    ProtocolViolation { checked_out: usize },

    /// The sample source could not produce an item.
    #[error("Sample source error: {source:#}")]
    DataSource {
        #[source]
        source: anyhow::Error,
    },

    /// `get_batch` failed after dispensing some samples. They are handed back
    /// in dispense order; the caller owns them and must return them.
    #[error("Batch interrupted after {} samples: {source}", .dispensed.len())]
    Interrupted {
        dispensed: Vec<Sample>,
        #[source]
        source: Box<BufferError>,
    },

    /// The background producer thread could not be started.
    #[error("Failed to spawn sample producer thread: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
}

impl BufferError {
    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn data_source(source: anyhow::Error) -> Self {
        Self::DataSource { source }
    }

    /// True for pool exhaustion, including a batch interrupted by it.
    pub fn is_protocol_violation(&self) -> bool {
        match self {
            Self::ProtocolViolation { .. } => true,
            Self::Interrupted { source, .. } => source.is_protocol_violation(),
            _ => false,
        }
    }

    /// Takes the samples carried by an `Interrupted` error, leaving it empty.
    /// Returns an empty `Vec` for every other variant.
    pub fn take_dispensed(&mut self) -> Vec<Sample> {
        match self {
            Self::Interrupted { dispensed, .. } => std::mem::take(dispensed),
            _ => Vec::new(),
        }
    }
}

pub type Result<T, E = BufferError> = std::result::Result<T, E>;
