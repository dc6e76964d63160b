//! Prometheus metrics for the order ledger.
//!
//! The services and adapters record through the `metrics` facade
//! (`metrics::counter!` and friends). This module installs the Prometheus recorder,
//! describes every metric the workspace emits, and renders the scrape payload.
//!
//! # Example
//!
//! ```rust,no_run
//! use order_ledger_runtime::metrics::MetricsServer;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut server = MetricsServer::new("0.0.0.0:9090".parse()?);
//! server.start()?;
//!
//! // Serve `server.render()` on GET /metrics
//! # Ok(())
//! # }
//! ```

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

/// Errors from metrics operations.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Prometheus recorder plus the address its scrape endpoint should be served on.
pub struct MetricsServer {
    addr: SocketAddr,
    handle: Option<PrometheusHandle>,
}

impl MetricsServer {
    /// Create a new metrics server for `addr` (e.g. `0.0.0.0:9090`).
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self { addr, handle: None }
    }

    /// Address the scrape endpoint should listen on.
    #[must_use]
    pub const fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Describe all metrics and install the global Prometheus recorder.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] if the exporter cannot be built or installed. A recorder
    /// that is already installed (e.g. by another test) is tolerated.
    pub fn start(&mut self) -> Result<(), MetricsError> {
        register_metrics();

        let builder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Suffix("duration_seconds".to_string()),
                &[
                    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
                ],
            )
            .map_err(|e| MetricsError::Build(e.to_string()))?;

        match builder.install_recorder() {
            Ok(handle) => {
                self.handle = Some(handle);
                tracing::info!(addr = %self.addr, "Metrics recorder installed");
                Ok(())
            }
            Err(e) => {
                let err_msg = e.to_string();
                if err_msg.contains("already initialized") {
                    tracing::warn!("Metrics recorder already initialized, skipping re-initialization");
                    Ok(())
                } else {
                    Err(MetricsError::Install(err_msg))
                }
            }
        }
    }

    /// Get the metrics handle for rendering.
    #[must_use]
    pub const fn handle(&self) -> Option<&PrometheusHandle> {
        self.handle.as_ref()
    }

    /// Render current metrics in Prometheus text format.
    ///
    /// Returns `None` if this server did not install the recorder.
    #[must_use]
    pub fn render(&self) -> Option<String> {
        self.handle.as_ref().map(PrometheusHandle::render)
    }
}

fn register_metrics() {
    describe_counter!("orders_ingested_total", "Orders mapped and persisted");
    describe_counter!(
        "orders_malformed_total",
        "Inbound order events rejected by validation"
    );
    describe_counter!(
        "orders_persistence_errors_total",
        "Order writes rejected by the store"
    );
    describe_counter!(
        "orders_dead_lettered_total",
        "Inbound payloads routed to the dead letter topic"
    );
    describe_counter!(
        "order_store_replaced_total",
        "Saves that replaced an existing order with the same id"
    );
    describe_counter!("order_queries_total", "Successful customer order queries");
    describe_counter!("order_query_errors_total", "Failed customer order queries");
    describe_histogram!(
        "order_query_duration_seconds",
        "Latency of customer order queries (find and sum joined)"
    );
    describe_counter!("consumer_messages_total", "Messages received by the order consumer");
    describe_histogram!(
        "consumer_handle_duration_seconds",
        "Time from message receipt to disposition"
    );
    describe_counter!("retry_attempts_total", "Retries scheduled after a transient failure");
    describe_counter!("retry_successes_total", "Operations that succeeded after retrying");
    describe_counter!("retry_exhausted_total", "Operations that failed after all retries");
    describe_counter!("shutdown_requested_total", "Shutdown signals sent to background tasks");
}

/// Inbound consumer metrics recorder.
pub struct ConsumerMetrics;

impl ConsumerMetrics {
    /// Record a handled message and how long it took.
    pub fn record_message(duration: Duration) {
        counter!("consumer_messages_total").increment(1);
        histogram!("consumer_handle_duration_seconds").record(duration.as_secs_f64());
    }

    /// Record a payload sent to the dead letter topic.
    pub fn record_dead_letter() {
        counter!("orders_dead_lettered_total").increment(1);
    }
}

/// Retry metrics recorder.
pub struct RetryMetrics;

impl RetryMetrics {
    /// Record a retry attempt.
    pub fn record_attempt() {
        counter!("retry_attempts_total").increment(1);
    }

    /// Record a successful retry.
    pub fn record_success() {
        counter!("retry_successes_total").increment(1);
    }

    /// Record exhausted retries.
    pub fn record_exhausted() {
        counter!("retry_exhausted_total").increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_server_creation() {
        let server = MetricsServer::new("127.0.0.1:0".parse().unwrap());
        assert!(server.handle().is_none());
        assert!(server.render().is_none());
    }

    #[test]
    fn test_metrics_server_render() {
        let mut server = MetricsServer::new("127.0.0.1:0".parse().unwrap());
        server.start().unwrap();

        ConsumerMetrics::record_message(Duration::from_millis(3));
        ConsumerMetrics::record_dead_letter();
        RetryMetrics::record_attempt();

        // handle is None if another test installed the recorder first
        if let Some(rendered) = server.render() {
            assert!(rendered.contains("consumer_messages_total"));
            assert!(rendered.contains("orders_dead_lettered_total"));
            assert!(rendered.contains("retry_attempts_total"));
        }
    }
}
