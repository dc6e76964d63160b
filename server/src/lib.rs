//! # Order Ledger Server
//!
//! Wiring for the `order-ledger` binary: configuration, logging and the metrics
//! endpoint. The binary itself (`main.rs`) connects the store, starts the event
//! consumer and serves the query API until Ctrl-C or a consumer halt.

pub mod config;
pub mod telemetry;

pub use config::{ConfigError, Environment, ServiceConfig};
