//! # Order Ledger Core
//!
//! Domain model and services for ingesting "order created" events and querying a
//! customer's orders.
//!
//! ## Flows
//!
//! ```text
//! Ingestion:  OrderCreatedEvent ──► map_event ──► OrderStore::save
//!
//! Query:      (customerId, page) ──┬─► OrderStore::find_all_by_customer_id ─┐
//!                                  └─► OrderStore::aggregate_sum ───────────┴─► assemble ──► OrderQueryResponse
//! ```
//!
//! ## Architecture Principles
//!
//! - Mapping and envelope assembly are pure functions
//! - Storage sits behind the [`store::OrderStore`] port
//! - Money is [`rust_decimal::Decimal`], never floating point
//! - Totals are computed once at ingestion and trusted on read
//!
//! ## Example
//!
//! ```ignore
//! use order_ledger_core::*;
//!
//! let store = Arc::new(PostgresOrderStore::new(pool, ORDERS_COLLECTION.to_string()));
//! let ingestion = OrderIngestionService::new(Arc::clone(&store));
//! let query = OrderQueryService::new(store);
//!
//! ingestion.ingest(&event).await?;
//! let response = query
//!     .query_orders(CustomerId::new(2), PageRequest::new(0, 10)?)
//!     .await?;
//! ```

pub mod aggregation;
pub mod envelope;
pub mod error;
pub mod ingestion;
pub mod mapper;
pub mod order;
pub mod page;
pub mod query;
pub mod store;

// Re-export commonly used types
pub use aggregation::{AggregationPipeline, Criteria, GroupSum, ORDERS_COLLECTION, Stage};
pub use envelope::{OrderQueryResponse, PaginationResponse, TOTAL_ON_ORDERS, assemble};
pub use error::{OrderError, Result, StoreError};
pub use ingestion::OrderIngestionService;
pub use mapper::map_event;
pub use order::{
    CustomerId, OrderCreatedEvent, OrderId, OrderItem, OrderItemEvent, OrderRecord,
    OrderSummaryView,
};
pub use page::{PageRequest, PageResult};
pub use query::OrderQueryService;
pub use rust_decimal::Decimal;
pub use store::{OrderStore, StoreResult};
