//! Customer order queries.

use crate::error::AppError;
use crate::state::AppState;
use axum::Json;
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use order_ledger_core::{CustomerId, OrderQueryResponse, OrderStore, PageRequest};
use serde::Deserialize;

/// Page used when `page` is absent.
pub const DEFAULT_PAGE: u32 = 0;

/// Page size used when `pageSize` is absent.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Query string of the order listing.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    /// Zero-based page index
    pub page: Option<u32>,
    /// Orders per page
    pub page_size: Option<u32>,
}

impl PageParams {
    /// Resolve defaults and enforce `1 <= pageSize <= max_page_size`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] (400) if the page size is zero or above the cap.
    pub fn to_page_request(self, max_page_size: u32) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(DEFAULT_PAGE);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size > max_page_size {
            return Err(AppError::bad_request(format!(
                "pageSize must be at most {max_page_size}"
            )));
        }
        Ok(PageRequest::new(page, page_size)?)
    }
}

/// List one page of a customer's orders with their overall total.
///
/// # Endpoint
///
/// ```text
/// GET /customers/{customerId}/orders?page=0&pageSize=10
/// ```
///
/// # Response
///
/// ```json
/// {
///   "data": [{ "orderId": 1, "customerId": 2, "total": 1000.0 }],
///   "pagination": { "totalElements": 1, "totalPages": 1, "page": 0, "pageSize": 10 },
///   "summary": { "totalOnOrders": 1000.0 }
/// }
/// ```
///
/// # Errors
///
/// - 400 for a non-numeric customer id or an invalid page
/// - 503 if the store cannot be read
pub async fn list_customer_orders<S: OrderStore + 'static>(
    State(state): State<AppState<S>>,
    customer_id: Result<Path<i64>, PathRejection>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<OrderQueryResponse>, AppError> {
    let Path(customer_id) = customer_id.map_err(|e| AppError::bad_request(e.body_text()))?;
    let Query(params) = params.map_err(|e| AppError::bad_request(e.body_text()))?;
    let page = params.to_page_request(state.max_page_size)?;

    let response = state
        .query
        .query_orders(CustomerId::new(customer_id), page)
        .await?;

    Ok(Json(response))
}
