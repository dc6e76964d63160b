//! Write path: map an inbound event and persist the resulting record.

use crate::error::{OrderError, Result};
use crate::mapper::map_event;
use crate::order::{OrderCreatedEvent, OrderRecord};
use crate::store::OrderStore;
use std::sync::Arc;

/// Orchestrates ingestion of [`OrderCreatedEvent`]s.
///
/// One durable write per call. No retries happen here; retrying belongs to the
/// transport that delivered the event.
pub struct OrderIngestionService<S> {
    store: Arc<S>,
}

impl<S> Clone for OrderIngestionService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: OrderStore> OrderIngestionService<S> {
    /// Create a service writing to `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Map `event` and persist the record.
    ///
    /// # Errors
    ///
    /// - [`OrderError::MalformedEvent`] if the event fails validation; nothing is written.
    /// - [`OrderError::Persistence`] if the store rejects the write.
    pub async fn ingest(&self, event: &OrderCreatedEvent) -> Result<()> {
        let record = match map_event(event) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(
                    order_id = %event.order_id,
                    customer_id = %event.customer_id,
                    error = %err,
                    "Rejected malformed order event"
                );
                metrics::counter!("orders_malformed_total").increment(1);
                return Err(err);
            }
        };

        self.persist(&record).await
    }

    async fn persist(&self, record: &OrderRecord) -> Result<()> {
        match self.store.save(record).await {
            Ok(_) => {
                tracing::info!(
                    order_id = %record.order_id,
                    customer_id = %record.customer_id,
                    item_count = record.items.len(),
                    total = %record.total,
                    "Order ingested"
                );
                metrics::counter!("orders_ingested_total").increment(1);
                Ok(())
            }
            Err(err) => {
                tracing::error!(
                    order_id = %record.order_id,
                    error = %err,
                    "Failed to persist order"
                );
                metrics::counter!("orders_persistence_errors_total").increment(1);
                Err(OrderError::Persistence(err))
            }
        }
    }
}
