use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::{ClientError, PinoramaClient};

/// Destination of the batches assembled by a [`BulkQueue`]
pub trait BulkSink: Send + Sync + 'static {
    fn send_batch(&self, records: Vec<Value>) -> impl Future<Output = Result<(), ClientError>> + Send;
}

impl BulkSink for PinoramaClient {
    fn send_batch(&self, records: Vec<Value>) -> impl Future<Output = Result<(), ClientError>> + Send {
        async move { self.bulk(&records).await }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BulkQueueOptions {
    /// Records buffered before a batch is sent
    pub batch_size: usize,
    /// Maximum time a record waits in the buffer
    pub flush_interval: Duration,
}

impl Default for BulkQueueOptions {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            flush_interval: Duration::from_secs(5),
        }
    }
}

/// Counters of a queue's activity
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub sent_batches: u64,
    pub sent_records: u64,
    pub failed_batches: u64,
    pub failed_records: u64,
}

#[derive(Default)]
struct Counters {
    sent_batches: AtomicU64,
    sent_records: AtomicU64,
    failed_batches: AtomicU64,
    failed_records: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> QueueStats {
        QueueStats {
            sent_batches: self.sent_batches.load(Ordering::Relaxed),
            sent_records: self.sent_records.load(Ordering::Relaxed),
            failed_batches: self.failed_batches.load(Ordering::Relaxed),
            failed_records: self.failed_records.load(Ordering::Relaxed),
        }
    }
}

enum Command {
    Record(Value),
    Flush(oneshot::Sender<()>),
}

/// Buffers records and ships them to a sink in batches
///
/// A batch is sent when `batch_size` records are buffered, every
/// `flush_interval`, on [`BulkQueue::flush`] and on [`BulkQueue::close`].
/// Failed batches are logged, counted and dropped.
pub struct BulkQueue {
    tx: mpsc::UnboundedSender<Command>,
    counters: Arc<Counters>,
    task: JoinHandle<()>,
}

impl BulkQueue {
    pub fn spawn<S: BulkSink>(sink: S, options: BulkQueueOptions) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        let task = tokio::spawn(run(sink, options, rx, counters.clone()));
        Self { tx, counters, task }
    }

    pub fn push(&self, record: Value) -> Result<(), ClientError> {
        self.tx
            .send(Command::Record(record))
            .map_err(|_| ClientError::QueueClosed)
    }

    /// Send everything buffered so far and wait for the batch to complete
    pub async fn flush(&self) -> Result<(), ClientError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(Command::Flush(done_tx))
            .map_err(|_| ClientError::QueueClosed)?;
        done_rx.await.map_err(|_| ClientError::QueueClosed)
    }

    pub fn stats(&self) -> QueueStats {
        self.counters.snapshot()
    }

    /// Drain the buffer and stop the queue
    pub async fn close(self) -> QueueStats {
        let Self { tx, counters, task } = self;
        drop(tx);
        if let Err(e) = task.await {
            tracing::error!(error = %e, "Bulk queue task failed");
        }
        counters.snapshot()
    }
}

async fn run<S: BulkSink>(
    sink: S,
    options: BulkQueueOptions,
    mut rx: mpsc::UnboundedReceiver<Command>,
    counters: Arc<Counters>,
) {
    let batch_size = options.batch_size.max(1);
    let mut buffer: Vec<Value> = Vec::with_capacity(batch_size);
    let mut ticker = tokio::time::interval(options.flush_interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Record(record)) => {
                    buffer.push(record);
                    if buffer.len() >= batch_size {
                        ship(&sink, &mut buffer, &counters).await;
                    }
                }
                Some(Command::Flush(done)) => {
                    ship(&sink, &mut buffer, &counters).await;
                    let _ = done.send(());
                }
                None => {
                    ship(&sink, &mut buffer, &counters).await;
                    break;
                }
            },

            _ = ticker.tick() => ship(&sink, &mut buffer, &counters).await,
        }
    }
}

async fn ship<S: BulkSink>(sink: &S, buffer: &mut Vec<Value>, counters: &Counters) {
    if buffer.is_empty() {
        return;
    }
    let batch = std::mem::take(buffer);
    let size = batch.len() as u64;

    match sink.send_batch(batch).await {
        Ok(()) => {
            counters.sent_batches.fetch_add(1, Ordering::Relaxed);
            counters.sent_records.fetch_add(size, Ordering::Relaxed);
            tracing::debug!(records = size, "Sent batch");
        }
        Err(e) => {
            counters.failed_batches.fetch_add(1, Ordering::Relaxed);
            counters.failed_records.fetch_add(size, Ordering::Relaxed);
            tracing::error!(records = size, error = %e, "Failed to send batch");
        }
    }
}
