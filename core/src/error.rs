//! Error types for order ingestion and querying.
//!
//! Two layers:
//!
//! - [`StoreError`] is what an [`OrderStore`](crate::store::OrderStore) adapter reports.
//! - [`OrderError`] is what the services report to their callers. Store failures are
//!   wrapped as [`OrderError::Persistence`] on the write path and
//!   [`OrderError::Retrieval`] on the read path. The wrapped store error is part of
//!   the message rather than a separate `source`.
//!
//! An aggregation over zero matching records is not an error: the services turn the
//! store's "no document" answer into decimal zero.

use thiserror::Error;

/// Errors reported by order record store adapters.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// A query or write was rejected by the store
    #[error("Query error: {0}")]
    Query(String),

    /// A stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The adapter cannot express the requested aggregation pipeline
    #[error("Unsupported pipeline: {0}")]
    UnsupportedPipeline(String),
}

/// Errors reported by the order services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// The inbound event is missing data or carries invalid values.
    ///
    /// Local to mapping; never retried. The transport should dead-letter the event.
    #[error("Malformed event: {0}")]
    MalformedEvent(String),

    /// The record could not be written.
    #[error("Failed to persist order: {0}")]
    Persistence(StoreError),

    /// Either branch of a query failed. No partial response is ever returned.
    #[error("Failed to retrieve orders: {0}")]
    Retrieval(StoreError),

    /// Page number or size out of range
    #[error("Invalid page request: {0}")]
    InvalidPageRequest(String),
}

impl OrderError {
    /// Whether retrying the same input could succeed.
    ///
    /// Malformed events and bad page requests are deterministic failures.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Persistence(_) | Self::Retrieval(_))
    }
}

/// Result type for order services.
pub type Result<T> = std::result::Result<T, OrderError>;
