//! Read path: a page of a customer's orders plus the sum of all their totals.

use crate::aggregation::AggregationPipeline;
use crate::envelope::{OrderQueryResponse, assemble};
use crate::error::{OrderError, Result};
use crate::order::{CustomerId, OrderSummaryView};
use crate::page::{PageRequest, PageResult};
use crate::store::OrderStore;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Instant;

/// Orchestrates customer order queries.
///
/// The paginated find and the aggregate sum are independent reads; [`query_orders`]
/// issues them concurrently and joins both before assembling the response. If either
/// fails, the other is dropped and the whole call fails.
///
/// [`query_orders`]: OrderQueryService::query_orders
pub struct OrderQueryService<S> {
    store: Arc<S>,
}

impl<S> Clone for OrderQueryService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: OrderStore> OrderQueryService<S> {
    /// Create a service reading from `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Page of the customer's orders together with their running total.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Retrieval`] if either store read fails.
    pub async fn query_orders(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> Result<OrderQueryResponse> {
        let started = Instant::now();

        let result = futures::try_join!(
            self.find_all_by_customer_id(customer_id, page),
            self.find_total_on_orders_by_customer_id(customer_id),
        );

        metrics::histogram!("order_query_duration_seconds").record(started.elapsed().as_secs_f64());

        match result {
            Ok((orders, total)) => {
                metrics::counter!("order_queries_total").increment(1);
                tracing::debug!(
                    customer_id = %customer_id,
                    page = page.page_number(),
                    page_size = page.page_size(),
                    returned = orders.content.len(),
                    total_elements = orders.total_elements,
                    total_on_orders = %total,
                    "Customer orders queried"
                );
                Ok(assemble(orders, total))
            }
            Err(err) => {
                metrics::counter!("order_query_errors_total").increment(1);
                tracing::error!(customer_id = %customer_id, error = %err, "Customer order query failed");
                Err(err)
            }
        }
    }

    /// One page of the customer's orders, projected to summaries.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Retrieval`] if the store read fails.
    pub async fn find_all_by_customer_id(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> Result<PageResult<OrderSummaryView>> {
        let records = self
            .store
            .find_all_by_customer_id(customer_id, page)
            .await
            .map_err(OrderError::Retrieval)?;

        Ok(records.map(|record| record.summary()))
    }

    /// Sum of every order total for the customer; zero when they have no orders.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::Retrieval`] if the aggregation fails.
    pub async fn find_total_on_orders_by_customer_id(&self, customer_id: CustomerId) -> Result<Decimal> {
        let pipeline = AggregationPipeline::total_by_customer(customer_id);

        let total = self
            .store
            .aggregate_sum(&pipeline)
            .await
            .map_err(OrderError::Retrieval)?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::order::{OrderId, OrderRecord};
    use crate::store::StoreResult;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubStore {
        records: Vec<OrderRecord>,
        sum: Option<Decimal>,
        fail_find: bool,
        fail_sum: bool,
        pipelines: Mutex<Vec<AggregationPipeline>>,
    }

    impl OrderStore for StubStore {
        async fn save(&self, record: &OrderRecord) -> StoreResult<OrderRecord> {
            Ok(record.clone())
        }

        async fn find_all_by_customer_id(
            &self,
            _customer_id: CustomerId,
            page: PageRequest,
        ) -> StoreResult<PageResult<OrderRecord>> {
            if self.fail_find {
                return Err(StoreError::Query("find failed".to_string()));
            }
            Ok(PageResult::new(self.records.clone(), page, self.records.len() as u64))
        }

        async fn aggregate_sum(&self, pipeline: &AggregationPipeline) -> StoreResult<Option<Decimal>> {
            self.pipelines.lock().unwrap().push(pipeline.clone());
            if self.fail_sum {
                return Err(StoreError::Query("sum failed".to_string()));
            }
            Ok(self.sum)
        }
    }

    fn record() -> OrderRecord {
        OrderRecord {
            order_id: OrderId::new(1),
            customer_id: CustomerId::new(2),
            total: dec!(20.40),
            items: vec![],
        }
    }

    #[tokio::test]
    async fn test_find_all_maps_records_to_summaries() {
        let store = Arc::new(StubStore {
            records: vec![record()],
            ..StubStore::default()
        });
        let service = OrderQueryService::new(store);

        let page = service
            .find_all_by_customer_id(CustomerId::new(1), PageRequest::new(0, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total_elements, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.page_number, 0);
        assert_eq!(page.content, vec![record().summary()]);
    }

    #[tokio::test]
    async fn test_total_uses_customer_pipeline() {
        let store = Arc::new(StubStore {
            sum: Some(dec!(1)),
            ..StubStore::default()
        });
        let service = OrderQueryService::new(Arc::clone(&store));

        let total = service
            .find_total_on_orders_by_customer_id(CustomerId::new(1))
            .await
            .unwrap();

        assert_eq!(total, dec!(1));
        let pipelines = store.pipelines.lock().unwrap();
        assert_eq!(pipelines.len(), 1);
        assert_eq!(
            pipelines[0],
            AggregationPipeline::total_by_customer(CustomerId::new(1))
        );
        assert_eq!(pipelines[0].collection(), "tb_orders");
    }

    #[tokio::test]
    async fn test_no_document_means_zero() {
        let service = OrderQueryService::new(Arc::new(StubStore::default()));

        let response = service
            .query_orders(CustomerId::new(1), PageRequest::new(0, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(response.total_on_orders(), Some(Decimal::ZERO));
        assert!(response.data.is_empty());
        assert_eq!(response.pagination.total_elements, 0);
        assert_eq!(response.pagination.total_pages, 0);
    }

    #[tokio::test]
    async fn test_failure_on_either_branch_fails_query() {
        for (fail_find, fail_sum) in [(true, false), (false, true)] {
            let service = OrderQueryService::new(Arc::new(StubStore {
                fail_find,
                fail_sum,
                ..StubStore::default()
            }));

            let err = service
                .query_orders(CustomerId::new(1), PageRequest::new(0, 10).unwrap())
                .await
                .unwrap_err();

            assert!(matches!(err, OrderError::Retrieval(_)));
        }
    }
}
