//! `order-ledger` service.
//!
//! Starts the Prometheus recorder, connects and migrates the order store, consumes
//! "order created" events and serves the query API. Runs until Ctrl-C or until the
//! consumer halts on a message it could not settle.

use anyhow::Context;
use order_ledger_core::{ORDERS_COLLECTION, OrderIngestionService, OrderQueryService};
use order_ledger_postgres::PostgresOrderStore;
use order_ledger_redpanda::{OrderEventConsumer, OrderEventHandler};
use order_ledger_runtime::{MetricsServer, RetryPolicy, shutdown_channel};
use order_ledger_server::{ServiceConfig, telemetry};
use order_ledger_web::{AppState, router};
use std::future::IntoFuture;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.observability.log_level);

    tracing::info!(
        environment = %config.environment,
        http_addr = %config.http.addr,
        metrics_addr = %config.observability.metrics_addr,
        topic = %config.kafka.topic,
        "Starting order ledger"
    );

    let mut metrics = MetricsServer::new(config.observability.metrics_addr);
    metrics.start()?;

    let store = PostgresOrderStore::new_with_separate_db(
        &config.database.url,
        config.database.max_connections,
        ORDERS_COLLECTION.to_string(),
    )
    .await
    .context("Failed to connect to order store")?;
    store.migrate().await.context("Failed to run migrations")?;
    let store = Arc::new(store);

    let (trigger, shutdown) = shutdown_channel();

    let consumer = OrderEventConsumer::builder()
        .brokers(&config.kafka.brokers)
        .topic(&config.kafka.topic)
        .dead_letter_topic(&config.kafka.dead_letter_topic)
        .consumer_group(&config.kafka.consumer_group)
        .build()?;
    let handler = OrderEventHandler::new(
        OrderIngestionService::new(Arc::clone(&store)),
        RetryPolicy::builder()
            .max_retries(config.kafka.max_retries)
            .build(),
    );
    let mut consumer_task = tokio::spawn(consumer.run(handler, trigger.subscribe()));

    let state = AppState::new(OrderQueryService::new(store))
        .with_max_page_size(config.http.max_page_size);
    let listener = tokio::net::TcpListener::bind(config.http.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.http.addr))?;
    let mut http_signal = shutdown.clone();
    let http_task = tokio::spawn(
        axum::serve(listener, router(state))
            .with_graceful_shutdown(async move { http_signal.wait().await })
            .into_future(),
    );
    tracing::info!(addr = %config.http.addr, "Query API listening");

    let metrics_task = match metrics.handle().cloned() {
        Some(handle) => {
            let listener = tokio::net::TcpListener::bind(metrics.addr())
                .await
                .with_context(|| format!("Failed to bind {}", metrics.addr()))?;
            let mut metrics_signal = shutdown.clone();
            tracing::info!(addr = %metrics.addr(), "Metrics endpoint listening");
            Some(tokio::spawn(
                axum::serve(listener, telemetry::metrics_router(handle))
                    .with_graceful_shutdown(async move { metrics_signal.wait().await })
                    .into_future(),
            ))
        }
        None => None,
    };

    let finished = tokio::select! {
        result = signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Received Ctrl+C, shutting down");
            None
        }
        result = &mut consumer_task => Some(result),
    };
    trigger.trigger();
    let consumer_result = match finished {
        Some(result) => result,
        None => consumer_task.await,
    };

    http_task.await??;
    if let Some(task) = metrics_task {
        task.await??;
    }

    consumer_result.context("Consumer task panicked")??;
    tracing::info!("Order ledger stopped");
    Ok(())
}
