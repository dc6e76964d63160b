//! Response envelope for customer order queries.
//!
//! ```json
//! {
//!   "data": [{ "orderId": 1, "customerId": 2, "total": 20.50 }],
//!   "pagination": { "page": 0, "pageSize": 10, "totalElements": 1, "totalPages": 1 },
//!   "summary": { "totalOnOrders": 20.50 }
//! }
//! ```

use crate::order::OrderSummaryView;
use crate::page::PageResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary key carrying the customer's running total.
pub const TOTAL_ON_ORDERS: &str = "totalOnOrders";

/// Page metadata as exposed to API clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    /// Number of matching orders across all pages
    pub total_elements: u64,
    /// Number of pages at the requested size
    pub total_pages: u64,
    /// Zero-based page index
    pub page: u32,
    /// Requested page size
    pub page_size: u32,
}

/// Combined result of a customer order query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderQueryResponse {
    /// Orders on the requested page
    pub data: Vec<OrderSummaryView>,
    /// Metadata for the whole matched set
    pub pagination: PaginationResponse,
    /// Aggregates over the whole matched set, keyed by name
    #[serde(with = "exact_values")]
    pub summary: BTreeMap<String, Decimal>,
}

impl OrderQueryResponse {
    /// The customer's total across all orders, if present in the summary.
    #[must_use]
    pub fn total_on_orders(&self) -> Option<Decimal> {
        self.summary.get(TOTAL_ON_ORDERS).copied()
    }
}

/// Place a page of summaries and the customer's total into a response.
#[must_use]
pub fn assemble(page: PageResult<OrderSummaryView>, total: Decimal) -> OrderQueryResponse {
    let pagination = PaginationResponse {
        total_elements: page.total_elements,
        total_pages: page.total_pages,
        page: page.page_number,
        page_size: page.page_size,
    };

    OrderQueryResponse {
        data: page.content,
        pagination,
        summary: BTreeMap::from([(TOTAL_ON_ORDERS.to_string(), total)]),
    }
}

/// Decimal map values as exact JSON numbers.
mod exact_values {
    use rust_decimal::Decimal;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    struct Exact<'a>(&'a Decimal);

    impl Serialize for Exact<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            rust_decimal::serde::arbitrary_precision::serialize(self.0, serializer)
        }
    }

    #[derive(Deserialize)]
    struct Owned(#[serde(with = "rust_decimal::serde::arbitrary_precision")] Decimal);

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<String, Decimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            out.serialize_entry(key, &Exact(value))?;
        }
        out.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Decimal>, D::Error> {
        let map = BTreeMap::<String, Owned>::deserialize(deserializer)?;
        Ok(map.into_iter().map(|(key, Owned(value))| (key, value)).collect())
    }
}
