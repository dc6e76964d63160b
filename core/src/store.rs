//! Order record store port.
//!
//! The services in this crate never talk to a database directly. They depend on
//! [`OrderStore`], which adapters implement against a concrete backend:
//!
//! - `PostgresOrderStore` (`order-ledger-postgres`) for production
//! - `InMemoryOrderStore` (`order-ledger-testing`) for fast, deterministic tests
//!
//! # Example
//!
//! ```ignore
//! let store = PostgresOrderStore::new(pool, ORDERS_COLLECTION.to_string());
//! store.save(&record).await?;
//!
//! let page = store
//!     .find_all_by_customer_id(CustomerId::new(2), PageRequest::new(0, 10)?)
//!     .await?;
//! let total = store
//!     .aggregate_sum(&AggregationPipeline::total_by_customer(CustomerId::new(2)))
//!     .await?;
//! ```

use crate::aggregation::AggregationPipeline;
use crate::error::StoreError;
use crate::order::{CustomerId, OrderRecord};
use crate::page::{PageRequest, PageResult};
use rust_decimal::Decimal;
use std::future::Future;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Durable storage for [`OrderRecord`]s, keyed by order identifier.
pub trait OrderStore: Send + Sync {
    /// Persist a record.
    ///
    /// An existing record with the same `order_id` is replaced.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the write fails.
    fn save(&self, record: &OrderRecord) -> impl Future<Output = StoreResult<OrderRecord>> + Send;

    /// Fetch one page of a customer's orders in the store's natural (insertion) order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the read fails.
    fn find_all_by_customer_id(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> impl Future<Output = StoreResult<PageResult<OrderRecord>>> + Send;

    /// Run a filter-then-group-sum pipeline.
    ///
    /// # Returns
    ///
    /// - `Some(sum)` when at least one document matched
    /// - `None` when nothing matched (no output document)
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsupportedPipeline`] if the adapter cannot express the
    /// pipeline, or another [`StoreError`] if the read fails.
    fn aggregate_sum(
        &self,
        pipeline: &AggregationPipeline,
    ) -> impl Future<Output = StoreResult<Option<Decimal>>> + Send;
}
