//! Given/when/then harness wiring both order services to one in-memory store.

#![allow(clippy::missing_panics_doc)] // Assertions panic

use crate::order_store::InMemoryOrderStore;
use order_ledger_core::{
    CustomerId, Decimal, OrderCreatedEvent, OrderIngestionService, OrderQueryResponse,
    OrderQueryService, PageRequest, Result,
};
use std::sync::Arc;

/// Drives ingestion and query against a shared [`InMemoryOrderStore`].
///
/// # Example
///
/// ```ignore
/// let mut harness = OrderLedgerHarness::new();
/// harness
///     .given_events(&[fixtures::order_created_with_one_item(1, 2)])
///     .await?
///     .then_total_on_orders(CustomerId::new(2), dec!(1000.0))
///     .await?;
/// ```
pub struct OrderLedgerHarness {
    store: Arc<InMemoryOrderStore>,
    ingestion: OrderIngestionService<InMemoryOrderStore>,
    query: OrderQueryService<InMemoryOrderStore>,
}

impl OrderLedgerHarness {
    /// Harness over a fresh, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(InMemoryOrderStore::new())
    }

    /// Harness over an existing store (e.g. one with injected failures).
    #[must_use]
    pub fn with_store(store: InMemoryOrderStore) -> Self {
        let store = Arc::new(store);
        Self {
            ingestion: OrderIngestionService::new(Arc::clone(&store)),
            query: OrderQueryService::new(Arc::clone(&store)),
            store,
        }
    }

    /// Ingest every event, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first ingestion error.
    pub async fn given_events(&mut self, events: &[OrderCreatedEvent]) -> Result<&mut Self> {
        for event in events {
            self.ingestion.ingest(event).await?;
        }
        Ok(self)
    }

    /// Ingest one event and return its outcome without short-circuiting.
    ///
    /// # Errors
    ///
    /// Returns the ingestion error.
    pub async fn when_ingesting(&self, event: &OrderCreatedEvent) -> Result<()> {
        self.ingestion.ingest(event).await
    }

    /// Query one page of the customer's orders.
    ///
    /// # Errors
    ///
    /// Returns [`order_ledger_core::OrderError::InvalidPageRequest`] for a zero page
    /// size, or the query service's error.
    pub async fn when_querying(
        &self,
        customer_id: CustomerId,
        page: u32,
        page_size: u32,
    ) -> Result<OrderQueryResponse> {
        let request = PageRequest::new(page, page_size)?;
        self.query.query_orders(customer_id, request).await
    }

    /// Assert the customer's `totalOnOrders`.
    ///
    /// # Errors
    ///
    /// Returns the query error if the lookup fails.
    pub async fn then_total_on_orders(
        &self,
        customer_id: CustomerId,
        expected: Decimal,
    ) -> Result<&Self> {
        let response = self.when_querying(customer_id, 0, 1).await?;
        assert_eq!(
            response.total_on_orders(),
            Some(expected),
            "Expected totalOnOrders {expected} for customer {customer_id}"
        );
        Ok(self)
    }

    /// Assert the number of stored records.
    pub fn then_stored_count(&self, expected: usize) -> &Self {
        assert_eq!(
            self.store.len(),
            expected,
            "Expected {expected} stored orders"
        );
        self
    }

    /// The shared store, for custom assertions or failure injection.
    #[must_use]
    pub const fn store(&self) -> &Arc<InMemoryOrderStore> {
        &self.store
    }

    /// The ingestion service under test.
    #[must_use]
    pub const fn ingestion(&self) -> &OrderIngestionService<InMemoryOrderStore> {
        &self.ingestion
    }

    /// The query service under test.
    #[must_use]
    pub const fn query(&self) -> &OrderQueryService<InMemoryOrderStore> {
        &self.query
    }
}

impl Default for OrderLedgerHarness {
    fn default() -> Self {
        Self::new()
    }
}
