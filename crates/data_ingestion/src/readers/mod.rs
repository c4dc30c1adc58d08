pub mod files;
pub mod lines;
pub mod memory;

pub use files::FileSource;
pub use lines::LineSource;
pub use memory::InMemorySource;

use crate::source::Shard;
use anyhow::Result;
use tracing::debug;

/// Endless walk over the item indices of one shard.
///
/// Wraps back to the start when the shard is exhausted and counts the passes,
/// so a source keeps feeding the buffer for as many epochs as training runs.
#[derive(Debug, Clone)]
pub(crate) struct ShardCursor {
    indices: Vec<usize>,
    position: usize,
    epoch: usize,
}

impl ShardCursor {
    pub(crate) fn new(shard: Shard, total: usize) -> Result<Self> {
        Ok(Self {
            indices: shard.partition(total)?,
            position: 0,
            epoch: 0,
        })
    }

    /// Global index of the next item, advancing the cursor.
    pub(crate) fn advance(&mut self) -> usize {
        if self.position == self.indices.len() {
            self.position = 0;
            self.epoch += 1;
            debug!(epoch = self.epoch, "Shard exhausted, starting next pass");
        }
        let index = self.indices[self.position];
        self.position += 1;
        index
    }

    pub(crate) fn len(&self) -> usize {
        self.indices.len()
    }

    pub(crate) fn epoch(&self) -> usize {
        self.epoch
    }
}
