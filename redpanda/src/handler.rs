//! Broker-independent message handling.
//!
//! [`OrderEventHandler`] turns one payload into a [`Disposition`]; [`settle`] turns a
//! disposition into an offset decision, publishing to the dead letter sink when
//! needed. Keeping both off the `rdkafka` types lets them run against in-memory
//! stores and sinks in tests.

use crate::decode::decode_event;
use crate::{ConsumerError, DeadLetterSink};
use order_ledger_core::{OrderError, OrderIngestionService, OrderStore};
use order_ledger_runtime::metrics::ConsumerMetrics;
use order_ledger_runtime::{RetryPolicy, retry_with_predicate};

/// What happened to one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Event mapped and persisted
    Ingested,
    /// Payload can never be ingested and belongs on the dead letter topic
    DeadLetter {
        /// Why the payload was rejected
        reason: String,
    },
    /// Persistence kept failing after retries; the message must be redelivered
    Failed {
        /// Last error
        error: OrderError,
    },
}

/// What to do with the message's offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Commit and move on
    Commit,
    /// Leave uncommitted and stop consuming
    Halt {
        /// Why consumption stopped
        reason: String,
    },
}

/// Decodes payloads and runs them through ingestion with retries.
pub struct OrderEventHandler<S> {
    ingestion: OrderIngestionService<S>,
    retry: RetryPolicy,
}

impl<S: OrderStore> OrderEventHandler<S> {
    /// Handler using `retry` for transient persistence failures.
    #[must_use]
    pub const fn new(ingestion: OrderIngestionService<S>, retry: RetryPolicy) -> Self {
        Self { ingestion, retry }
    }

    /// Decode and ingest one payload.
    pub async fn handle(&self, payload: Option<&[u8]>) -> Disposition {
        let event = match decode_event(payload) {
            Ok(event) => event,
            Err(err) => {
                tracing::warn!(error = %err, "Dropping undecodable order payload");
                return Disposition::DeadLetter {
                    reason: err.to_string(),
                };
            }
        };

        let result = retry_with_predicate(
            &self.retry,
            || self.ingestion.ingest(&event),
            OrderError::is_transient,
        )
        .await;

        match result {
            Ok(()) => Disposition::Ingested,
            Err(err @ OrderError::MalformedEvent(_)) => Disposition::DeadLetter {
                reason: err.to_string(),
            },
            Err(error) => Disposition::Failed { error },
        }
    }
}

/// Resolve a disposition, dead-lettering the payload when required.
///
/// A dead letter that cannot be published is treated like a persistence failure: the
/// offset stays uncommitted so the message is not lost.
pub async fn settle<D: DeadLetterSink>(
    sink: &D,
    disposition: Disposition,
    key: Option<&[u8]>,
    payload: Option<&[u8]>,
) -> Settlement {
    match disposition {
        Disposition::Ingested => Settlement::Commit,
        Disposition::DeadLetter { reason } => {
            match sink.publish(key, payload.unwrap_or_default(), &reason).await {
                Ok(()) => {
                    ConsumerMetrics::record_dead_letter();
                    Settlement::Commit
                }
                Err(err) => {
                    tracing::error!(error = %err, "Failed to dead-letter order payload");
                    Settlement::Halt {
                        reason: err.to_string(),
                    }
                }
            }
        }
        Disposition::Failed { error } => {
            tracing::error!(error = %error, "Order ingestion failed after retries");
            Settlement::Halt {
                reason: error.to_string(),
            }
        }
    }
}

impl Settlement {
    /// `Ok` to commit, [`ConsumerError::Halted`] to stop.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Halted`] for [`Settlement::Halt`].
    pub fn into_result(self) -> Result<(), ConsumerError> {
        match self {
            Self::Commit => Ok(()),
            Self::Halt { reason } => Err(ConsumerError::Halted(reason)),
        }
    }
}
