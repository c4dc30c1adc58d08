use serde::Deserialize;

/// Memory backend a `Sample` is tagged with.
///
/// The tag travels with the storage so downstream stages know where the bytes
/// are expected to live. This crate only allocates host memory; moving bytes
/// onto a device is the consumer's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Host,
    Device,
}

/// The `Sample` struct is a reusable unit of raw data storage flowing through
/// the ingestion pipeline.
///
/// A sample is allocated once (at buffer warm-up), pre-sized to a configured
/// byte capacity, and then recycled for the lifetime of the buffer. A
/// `SampleSource` overwrites its bytes in place, so steady-state reads do not
/// reallocate as long as items fit into the initial capacity.
///
/// Internally a sample stores:
/// - **data**(`Vec<u8>`): the item bytes; `len()` is the size of the current item
/// - **backend**(`Backend`): where the storage is meant to live
/// - **source_index**(`Option<usize>`): global index of the item currently held
///
/// # Examples:
/// ```ignore
/// let mut sample = Sample::with_capacity(Backend::Host, 4096);
/// sample.fill_from(b"hello");
/// sample.set_source_index(7);
/// assert_eq!(sample.as_bytes(), b"hello");
/// ```
#[derive(Debug)]
pub struct Sample {
    data: Vec<u8>,
    backend: Backend,
    source_index: Option<usize>,
}

impl Sample {
    /// Creates an empty sample whose storage is allocated and written once.
    ///
    /// The full capacity is zero-written once so its pages are committed
    /// before the first read.
    pub fn with_capacity(backend: Backend, initial_bytes: usize) -> Self {
        let mut data = Vec::with_capacity(initial_bytes);
        data.resize(initial_bytes, 0);
        data.clear();
        Self {
            data,
            backend,
            source_index: None,
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Number of bytes of the item currently held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes the storage can hold without reallocating.
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Resizes the item to `len` bytes. New bytes are zeroed.
    pub fn resize(&mut self, len: usize) {
        self.data.resize(len, 0);
    }

    /// Replaces the item bytes with a copy of `bytes`.
    pub fn fill_from(&mut self, bytes: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
    }

    /// Gives direct access to the backing vector, for readers that stream
    /// into it (e.g. `Read::read_to_end`).
    pub fn storage_mut(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    /// Global index of the item currently stored, if a source set one.
    pub fn source_index(&self) -> Option<usize> {
        self.source_index
    }

    pub fn set_source_index(&mut self, index: usize) {
        self.source_index = Some(index);
    }

    /// Drops the current item but keeps the allocation.
    pub(crate) fn reset(&mut self) {
        self.data.clear();
        self.source_index = None;
    }
}
