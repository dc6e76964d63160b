//! In-memory order record store for fast, deterministic testing.
//!
//! [`InMemoryOrderStore`] behaves like the `PostgreSQL` adapter (upsert by order id,
//! insertion-order pagination, `None` for an aggregation with no matches) and adds:
//!
//! - failure injection for the write and read paths
//! - capture of every pipeline and page request it receives

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use order_ledger_core::{
    AggregationPipeline, CustomerId, Decimal, OrderId, OrderRecord, OrderStore, PageRequest,
    PageResult, StoreError, StoreResult,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Failures {
    writes: Option<StoreError>,
    reads: Option<StoreError>,
    aggregations: Option<StoreError>,
}

/// In-memory [`OrderStore`].
///
/// Clones share the same underlying data, so a test can keep one handle for
/// assertions while the services own another.
///
/// # Example
///
/// ```
/// use order_ledger_core::{CustomerId, OrderStore, PageRequest};
/// use order_ledger_testing::{InMemoryOrderStore, fixtures};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryOrderStore::new();
/// store.save(&fixtures::order_record(1, 2)).await?;
///
/// let page = store
///     .find_all_by_customer_id(CustomerId::new(2), PageRequest::new(0, 10)?)
///     .await?;
/// assert_eq!(page.total_elements, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryOrderStore {
    records: Arc<RwLock<Vec<OrderRecord>>>,
    failures: Arc<RwLock<Failures>>,
    pipelines: Arc<RwLock<Vec<AggregationPipeline>>>,
    page_requests: Arc<RwLock<Vec<(CustomerId, PageRequest)>>>,
    save_count: Arc<AtomicUsize>,
}

impl InMemoryOrderStore {
    /// Create a new empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`, in order.
    #[must_use]
    pub fn with_records(records: impl IntoIterator<Item = OrderRecord>) -> Self {
        let store = Self::new();
        store.records.write().unwrap().extend(records);
        store
    }

    /// Make every subsequent `save` fail with `error`.
    pub fn fail_writes(&self, error: StoreError) {
        self.failures.write().unwrap().writes = Some(error);
    }

    /// Make every subsequent `find_all_by_customer_id` fail with `error`.
    pub fn fail_reads(&self, error: StoreError) {
        self.failures.write().unwrap().reads = Some(error);
    }

    /// Make every subsequent `aggregate_sum` fail with `error`.
    pub fn fail_aggregations(&self, error: StoreError) {
        self.failures.write().unwrap().aggregations = Some(error);
    }

    /// Remove all injected failures.
    pub fn heal(&self) {
        *self.failures.write().unwrap() = Failures::default();
    }

    /// Remove all records and captured calls (for test isolation).
    pub fn clear(&self) {
        self.records.write().unwrap().clear();
        self.pipelines.write().unwrap().clear();
        self.page_requests.write().unwrap().clear();
        self.save_count.store(0, Ordering::SeqCst);
    }

    /// Every stored record in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<OrderRecord> {
        self.records.read().unwrap().clone()
    }

    /// Look up one record.
    #[must_use]
    pub fn get(&self, order_id: OrderId) -> Option<OrderRecord> {
        self.records
            .read()
            .unwrap()
            .iter()
            .find(|r| r.order_id == order_id)
            .cloned()
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    /// Whether the store holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }

    /// Number of `save` calls that reached the store, including failed ones.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Pipelines passed to `aggregate_sum`, in call order.
    #[must_use]
    pub fn captured_pipelines(&self) -> Vec<AggregationPipeline> {
        self.pipelines.read().unwrap().clone()
    }

    /// Arguments passed to `find_all_by_customer_id`, in call order.
    #[must_use]
    pub fn captured_page_requests(&self) -> Vec<(CustomerId, PageRequest)> {
        self.page_requests.read().unwrap().clone()
    }
}

impl OrderStore for InMemoryOrderStore {
    async fn save(&self, record: &OrderRecord) -> StoreResult<OrderRecord> {
        self.save_count.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failures.read().unwrap().writes.clone() {
            return Err(err);
        }

        let mut records = self.records.write().unwrap();
        if let Some(existing) = records.iter_mut().find(|r| r.order_id == record.order_id) {
            tracing::warn!(order_id = %record.order_id, "Order already existed and was replaced");
            *existing = record.clone();
        } else {
            records.push(record.clone());
        }
        Ok(record.clone())
    }

    async fn find_all_by_customer_id(
        &self,
        customer_id: CustomerId,
        page: PageRequest,
    ) -> StoreResult<PageResult<OrderRecord>> {
        self.page_requests
            .write()
            .unwrap()
            .push((customer_id, page));
        if let Some(err) = self.failures.read().unwrap().reads.clone() {
            return Err(err);
        }

        let records = self.records.read().unwrap();
        let matching: Vec<&OrderRecord> = records
            .iter()
            .filter(|r| r.customer_id == customer_id)
            .collect();
        let total = matching.len() as u64;
        let offset = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let content = matching
            .into_iter()
            .skip(offset)
            .take(page.page_size() as usize)
            .cloned()
            .collect();

        Ok(PageResult::new(content, page, total))
    }

    async fn aggregate_sum(&self, pipeline: &AggregationPipeline) -> StoreResult<Option<Decimal>> {
        self.pipelines.write().unwrap().push(pipeline.clone());
        if let Some(err) = self.failures.read().unwrap().aggregations.clone() {
            return Err(err);
        }

        pipeline.evaluate(self.records.read().unwrap().iter())
    }
}
