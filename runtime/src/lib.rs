//! # Order Ledger Runtime
//!
//! Operational plumbing shared by the order ledger's transport and server crates.
//!
//! ## Components
//!
//! - **Retry**: exponential backoff for transient failures, driven by the transport
//! - **Metrics**: Prometheus recorder and the metric recorders used by the consumer
//! - **Shutdown**: cooperative shutdown signal for long-running tasks
//!
//! ## Example
//!
//! ```ignore
//! use order_ledger_runtime::{RetryPolicy, retry_with_predicate, shutdown_channel};
//!
//! let (trigger, signal) = shutdown_channel();
//! let stored = retry_with_predicate(
//!     &RetryPolicy::default(),
//!     || ingestion.ingest(&event),
//!     OrderError::is_transient,
//! )
//! .await?;
//! ```

/// Retry logic with exponential backoff
pub mod retry;

/// Prometheus metrics for observability
pub mod metrics;

/// Cooperative shutdown signalling
pub mod shutdown;

pub use metrics::{MetricsError, MetricsServer};
pub use retry::{RetryPolicy, RetryPolicyBuilder, retry_with_predicate};
pub use shutdown::{ShutdownSignal, ShutdownTrigger, shutdown_channel};
