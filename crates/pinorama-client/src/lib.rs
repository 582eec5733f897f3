//! Client for the pinorama server
//!
//! [`PinoramaClient`] wraps the HTTP routes with retries and exponential
//! backoff. [`BulkQueue`] batches records in the background before sending
//! them, and [`parse_line`] turns raw log output into records.

mod client;
mod error;
mod line;
mod queue;

pub use client::{backoff_delay, ClientOptions, PinoramaClient, DEFAULT_URL};
pub use error::ClientError;
pub use line::parse_line;
pub use queue::{BulkQueue, BulkQueueOptions, BulkSink, QueueStats};
