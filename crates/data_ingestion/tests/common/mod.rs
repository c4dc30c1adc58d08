#![allow(dead_code)]

use data_ingestion::{Sample, SampleBufferConfig, SampleSource, Shard};

use anyhow::{bail, Result};

/// Test source that yields the item index as 8 little-endian bytes,
/// cycling over `len` items. Remembers the shard it was opened with.
pub struct CountingSource {
    pub shard: Shard,
    pub len: usize,
    pub next: usize,
    pub reads: usize,
    /// 1-based read number that fails, if any
    pub fail_on_read: Option<usize>,
}

impl CountingSource {
    pub fn open(shard: Shard, len: usize) -> Result<Self> {
        Ok(Self {
            shard,
            len,
            next: 0,
            reads: 0,
            fail_on_read: None,
        })
    }
}

impl SampleSource for CountingSource {
    fn read_sample(&mut self, sample: &mut Sample) -> Result<()> {
        self.reads += 1;
        if self.fail_on_read == Some(self.reads) {
            bail!("simulated read failure at read {}", self.reads);
        }
        sample.fill_from(&(self.next as u64).to_le_bytes());
        sample.set_source_index(self.next);
        self.next = (self.next + 1) % self.len;
        Ok(())
    }

    fn size(&self) -> usize {
        self.len
    }
}

/// Decodes the item index written by `CountingSource`.
pub fn item_of(sample: &Sample) -> u64 {
    let bytes: [u8; 8] = sample.as_bytes()[..8]
        .try_into()
        .expect("sample holds 8 bytes");
    u64::from_le_bytes(bytes)
}

/// Config used across tests: small samples, fixed seed.
pub fn test_config(shuffle: bool, initial_fill: usize, batch_size: usize) -> SampleBufferConfig {
    SampleBufferConfig::builder()
        .shuffle(shuffle)
        .initial_fill(initial_fill)
        .batch_size(batch_size)
        .initial_bytes(8)
        .seed(42)
        .build()
}

/// Routes `tracing` output through the test harness so it shows on failure.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
