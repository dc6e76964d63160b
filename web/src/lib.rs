//! Axum query API for Order Ledger.
//!
//! # Routes
//!
//! ```text
//! GET /customers/{customerId}/orders?page=&pageSize=   page of orders + totalOnOrders
//! GET /health                                          liveness
//! ```
//!
//! Handlers stay thin: parse the request, call
//! [`OrderQueryService`](order_ledger_core::OrderQueryService), map errors through
//! [`AppError`].
//!
//! # Example
//!
//! ```ignore
//! use order_ledger_web::{AppState, router};
//!
//! let state = AppState::new(OrderQueryService::new(store)).with_max_page_size(100);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, router(state)).await?;
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod handlers;
pub mod state;

use axum::Router;
use axum::routing::get;
use order_ledger_core::OrderStore;
use tower_http::trace::TraceLayer;

// Re-export key types for convenience
pub use error::AppError;
pub use state::{AppState, DEFAULT_MAX_PAGE_SIZE};

/// Build the query API router.
pub fn router<S: OrderStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route(
            "/customers/:customer_id/orders",
            get(handlers::list_customer_orders::<S>),
        )
        .route("/health", get(handlers::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
