use crate::readers::ShardCursor;
use crate::sample::Sample;
use crate::source::{SampleSource, Shard};
use anyhow::Result;
use std::sync::Arc;

/// A source that serves records held in memory as atomically reference
/// counted, contiguous storage (`Arc<[Vec<u8>]>`).
///
/// This enables:
/// - Zero-copy clone: several shards of the same dataset share one copy
/// - Thread-safe sharing: buffers on different threads read the same records
///
/// Ideal for datasets that comfortably fit into RAM, and for tests.
///
/// # Example
/// ```ignore
/// let records: Arc<[Vec<u8>]> = load_records().into();
/// let shard0 = InMemorySource::from_shared(records.clone(), Shard::new(0, 2))?;
/// let shard1 = InMemorySource::from_shared(records, Shard::new(1, 2))?;
/// ```
#[derive(Debug, Clone)]
pub struct InMemorySource {
    records: Arc<[Vec<u8>]>,
    cursor: ShardCursor,
    shard: Shard,
}

impl InMemorySource {
    /// Creates a source over `records`, restricted to `shard`.
    pub fn new(records: Vec<Vec<u8>>, shard: Shard) -> Result<Self> {
        Self::from_shared(records.into(), shard)
    }

    pub fn from_shared(records: Arc<[Vec<u8>]>, shard: Shard) -> Result<Self> {
        let cursor = ShardCursor::new(shard, records.len())?;
        Ok(Self {
            records,
            cursor,
            shard,
        })
    }

    pub fn shard(&self) -> Shard {
        self.shard
    }

    /// Number of completed passes over this shard.
    pub fn epoch(&self) -> usize {
        self.cursor.epoch()
    }
}

impl SampleSource for InMemorySource {
    fn read_sample(&mut self, sample: &mut Sample) -> Result<()> {
        let index = self.cursor.advance();
        sample.fill_from(&self.records[index]);
        sample.set_source_index(index);
        Ok(())
    }

    fn size(&self) -> usize {
        self.cursor.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Backend;

    fn records(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|i| vec![i as u8; i + 1]).collect()
    }

    #[test]
    fn test_streams_shard_in_order() -> Result<()> {
        let mut source = InMemorySource::new(records(6), Shard::new(0, 2))?;
        assert_eq!(source.size(), 3);

        let mut sample = Sample::with_capacity(Backend::Host, 16);
        let mut seen = Vec::new();
        for _ in 0..4 {
            source.read_sample(&mut sample)?;
            seen.push(sample.source_index().unwrap());
            assert_eq!(sample.len(), sample.source_index().unwrap() + 1);
        }
        assert_eq!(seen, vec![0, 2, 4, 0]);
        assert_eq!(source.epoch(), 1);
        Ok(())
    }

    #[test]
    fn test_rejects_empty_and_bad_shard() {
        assert!(InMemorySource::new(Vec::new(), Shard::default()).is_err());
        assert!(InMemorySource::new(records(4), Shard::new(3, 3)).is_err());
    }

    #[test]
    fn test_shared_records() -> Result<()> {
        let shared: Arc<[Vec<u8>]> = records(4).into();
        let a = InMemorySource::from_shared(shared.clone(), Shard::new(0, 2))?;
        let b = InMemorySource::from_shared(shared.clone(), Shard::new(1, 2))?;
        assert_eq!(Arc::strong_count(&shared), 3);
        assert_eq!(a.shard(), Shard::new(0, 2));
        assert_eq!(b.size(), 2);
        Ok(())
    }
}
