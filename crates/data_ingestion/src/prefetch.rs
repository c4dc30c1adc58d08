//! Background batch assembly for a `SampleBuffer`.
//!
//! A `BatchPrefetcher` moves a buffer onto its own producer thread, which
//! keeps exactly one batch assembled ahead of the consumer. Batches are
//! handed over a rendezvous channel, so the producer starts on batch `k + 2`
//! only once the consumer has taken batch `k + 1`.
//!
//! # Consumer contract
//! Return every sample of batch `k` before calling `next_batch` for batch
//! `k + 1`. The recycle pool holds two batches: one in the consumer's hands,
//! one being assembled. Keeping more than that out exhausts the pool and the
//! next `next_batch` yields `ProtocolViolation`.

use crate::buffer::{Recycler, SampleBuffer};
use crate::error::{BufferError, Result};
use crate::sample::Sample;
use crate::source::SampleSource;
use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

type BatchResult = Result<Vec<Sample>>;

/// Owns a producer thread that assembles batches from a `SampleBuffer`.
///
/// Dropping the prefetcher signals shutdown and joins the thread; the buffer
/// is released on that thread.
pub struct BatchPrefetcher {
    batch_rx: Receiver<BatchResult>,
    recycler: Recycler,
    batch_size: usize,
    shutdown: Arc<AtomicBool>,
    producer: Option<JoinHandle<()>>,
}

impl BatchPrefetcher {
    /// Moves `buffer` onto a new thread named `sample-prefetch` that builds
    /// batches of the buffer's configured `batch_size`.
    ///
    /// `poll_interval` bounds how long the producer waits on a consumer
    /// before re-checking for shutdown.
    pub fn spawn<S>(buffer: SampleBuffer<S>, poll_interval: Duration) -> Result<Self>
    where
        S: SampleSource + 'static,
    {
        let batch_size = buffer.config().batch_size;
        let recycler = buffer.recycler();
        let shutdown = Arc::new(AtomicBool::new(false));
        let (batch_tx, batch_rx) = bounded(0);

        let producer = {
            let shutdown = Arc::clone(&shutdown);
            thread::Builder::new()
                .name("sample-prefetch".to_string())
                .spawn(move || producer_main(buffer, batch_size, batch_tx, shutdown, poll_interval))
                .map_err(|source| BufferError::Spawn { source })?
        };

        info!(batch_size, "Started sample prefetcher");
        Ok(Self {
            batch_rx,
            recycler,
            batch_size,
            shutdown,
            producer: Some(producer),
        })
    }

    /// Blocks until the next batch is ready.
    ///
    /// Returns `None` once the producer has stopped (after it reported an
    /// error, or during shutdown). An `Interrupted` error carries the samples
    /// of the partial batch; recycle them like any other batch.
    pub fn next_batch(&self) -> Option<BatchResult> {
        self.batch_rx.recv().ok()
    }

    /// Handle for returning samples to the underlying buffer.
    pub fn recycler(&self) -> Recycler {
        self.recycler.clone()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Drop for BatchPrefetcher {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.producer.take() {
            let _ = handle.join();
        }
        debug!("Stopped sample prefetcher");
    }
}

fn producer_main<S: SampleSource>(
    mut buffer: SampleBuffer<S>,
    batch_size: usize,
    batch_tx: Sender<BatchResult>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) {
    while !shutdown.load(Ordering::Relaxed) {
        let batch = buffer.get_batch(batch_size);
        let failed = batch.is_err();

        if !send_batch(&batch_tx, &shutdown, batch, poll_interval) || failed {
            return;
        }
    }
}

/// Send a batch with retry on timeout, checking shutdown between attempts.
/// Returns false if the batch could not be delivered.
fn send_batch(
    batch_tx: &Sender<BatchResult>,
    shutdown: &AtomicBool,
    mut batch: BatchResult,
    poll_interval: Duration,
) -> bool {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return false;
        }
        match batch_tx.send_timeout(batch, poll_interval) {
            Ok(()) => return true,
            Err(SendTimeoutError::Timeout(returned)) => {
                batch = returned; // Retry with same batch
            }
            Err(SendTimeoutError::Disconnected(_)) => return false,
        }
    }
}
