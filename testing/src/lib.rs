//! # Order Ledger Testing
//!
//! Testing utilities for the order ledger.
//!
//! This crate provides:
//! - [`InMemoryOrderStore`]: an [`OrderStore`](order_ledger_core::OrderStore) with
//!   failure injection and call capture
//! - [`fixtures`]: ready-made events and records
//! - [`OrderLedgerHarness`]: given/when/then wiring of both services
//! - [`init_test_tracing`]: opt-in log output for a failing test
//!
//! ## Example
//!
//! ```ignore
//! use order_ledger_testing::{OrderLedgerHarness, fixtures};
//!
//! #[tokio::test]
//! async fn test_order_flow() {
//!     let mut harness = OrderLedgerHarness::new();
//!     harness
//!         .given_events(&[fixtures::order_created_with_two_items(1, 2)])
//!         .await
//!         .unwrap();
//!
//!     let response = harness.when_querying(CustomerId::new(2), 0, 10).await.unwrap();
//!     assert_eq!(response.data.len(), 1);
//! }
//! ```

pub mod fixtures;
pub mod harness;
pub mod order_store;

pub use harness::OrderLedgerHarness;
pub use order_store::InMemoryOrderStore;

/// Install a `tracing` subscriber honouring `RUST_LOG`, writing through the test
/// capture. Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
