//! Redpanda transport for inbound "order created" events.
//!
//! Any Kafka-compatible broker works (Redpanda, Apache Kafka, MSK); the client is
//! `rdkafka`.
//!
//! # Flow
//!
//! ```text
//! order-created ──► decode ──► OrderIngestionService::ingest ──► commit
//!                     │                  │
//!                     │ malformed        │ persistence failure
//!                     ▼                  ▼
//!              order-created-dlq    retry with backoff ──► still failing: stop, no commit
//!              (+ "error" header)
//! ```
//!
//! # Delivery Semantics
//!
//! **At-least-once** with manual offset commits. A redelivered event is upserted by
//! order id, so replays converge on the same record.
//!
//! # Example
//!
//! ```no_run
//! use order_ledger_core::OrderIngestionService;
//! use order_ledger_redpanda::{OrderEventConsumer, OrderEventHandler};
//! use order_ledger_runtime::{RetryPolicy, shutdown_channel};
//! # use std::sync::Arc;
//! # use order_ledger_core::OrderStore;
//!
//! # async fn example<S: OrderStore>(store: Arc<S>) -> Result<(), Box<dyn std::error::Error>> {
//! let consumer = OrderEventConsumer::builder()
//!     .brokers("localhost:9092")
//!     .build()?;
//! let handler = OrderEventHandler::new(OrderIngestionService::new(store), RetryPolicy::default());
//!
//! let (_trigger, signal) = shutdown_channel();
//! consumer.run(handler, signal).await?;
//! # Ok(())
//! # }
//! ```

pub mod consumer;
pub mod decode;
pub mod handler;

use std::future::Future;
use thiserror::Error;

pub use consumer::{KafkaDeadLetterSink, OrderEventConsumer, OrderEventConsumerBuilder};
pub use decode::decode_event;
pub use handler::{Disposition, OrderEventHandler, Settlement, settle};

/// Header carrying the rejection reason on dead-lettered messages.
pub const DLQ_ERROR_HEADER: &str = "error";

/// Errors from the inbound transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsumerError {
    /// A broker client could not be created
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Subscribing to the event topic failed
    #[error("Failed to subscribe to {topic}: {reason}")]
    Subscription {
        /// Topic name
        topic: String,
        /// Broker error
        reason: String,
    },

    /// Publishing to the dead letter topic failed
    #[error("Dead letter publish failed: {0}")]
    DeadLetter(String),

    /// A message was left uncommitted and consumption stopped
    #[error("Consumer halted: {0}")]
    Halted(String),
}

/// Destination for payloads that can never be ingested.
pub trait DeadLetterSink: Send + Sync {
    /// Publish `payload` with its original `key`, recording `reason`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::DeadLetter`] if the payload could not be stored.
    fn publish(
        &self,
        key: Option<&[u8]>,
        payload: &[u8],
        reason: &str,
    ) -> impl Future<Output = Result<(), ConsumerError>> + Send;
}
