//! Integration tests for [`OrderEventConsumer`] with a real Kafka instance.
//!
//! # Running These Tests
//!
//! These tests are marked as `#[ignore]` by default because they require Docker
//! (for testcontainers) and take a while to spin up Kafka.
//!
//! ```bash
//! cargo test -p order-ledger-redpanda --test integration_tests -- --ignored
//! ```

#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::panic)]

use futures::StreamExt;
use order_ledger_core::{CustomerId, OrderId, OrderIngestionService};
use order_ledger_redpanda::{DLQ_ERROR_HEADER, OrderEventConsumer, OrderEventHandler};
use order_ledger_runtime::{RetryPolicy, shutdown_channel};
use order_ledger_testing::InMemoryOrderStore;
use rdkafka::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::message::{Headers, Message};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::kafka::{KAFKA_PORT, Kafka};

const TOPIC: &str = "order-created";
const DLQ_TOPIC: &str = "order-created-dlq";

fn producer(brokers: &str) -> FutureProducer {
    ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("message.timeout.ms", "5000")
        .create()
        .expect("Failed to create producer")
}

/// Publish until the broker accepts the message (topic auto-creation races startup).
async fn publish(producer: &FutureProducer, topic: &str, key: &str, payload: &str) {
    for attempt in 1..=60 {
        let record = FutureRecord::to(topic).key(key).payload(payload);
        if producer
            .send(record, Timeout::After(Duration::from_secs(5)))
            .await
            .is_ok()
        {
            return;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(attempt != 60, "Failed to publish to {topic}");
    }
}

#[tokio::test]
#[ignore]
async fn test_consumer_ingests_and_dead_letters() {
    let kafka = Kafka::default()
        .with_env_var("KAFKA_AUTO_CREATE_TOPICS_ENABLE", "true")
        .start()
        .await
        .expect("Failed to start Kafka container");
    let host = kafka.get_host().await.expect("Failed to get host");
    let port = kafka
        .get_host_port_ipv4(KAFKA_PORT)
        .await
        .expect("Failed to get port");
    let brokers = format!("{host}:{port}");

    let producer = producer(&brokers);
    publish(
        &producer,
        TOPIC,
        "1",
        r#"{"codigoPedido":1,"codigoCliente":2,"itens":[{"produto":"tablet","quantidade":2,"preco":1250.0}]}"#,
    )
    .await;
    publish(&producer, TOPIC, "2", r#"{"codigoPedido":2,"codigoCliente":2,"itens":[]}"#).await;

    let store = InMemoryOrderStore::new();
    let handler = OrderEventHandler::new(
        OrderIngestionService::new(Arc::new(store.clone())),
        RetryPolicy::default(),
    );
    let consumer = OrderEventConsumer::builder()
        .brokers(&brokers)
        .topic(TOPIC)
        .dead_letter_topic(DLQ_TOPIC)
        .consumer_group("order-ledger-it")
        .build()
        .expect("Failed to build consumer");
    let (trigger, signal) = shutdown_channel();
    let task = tokio::spawn(consumer.run(handler, signal));

    let dlq: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", &brokers)
        .set("group.id", "order-ledger-it-dlq")
        .set("auto.offset.reset", "earliest")
        .create()
        .expect("Failed to create DLQ consumer");
    dlq.subscribe(&[DLQ_TOPIC]).expect("Failed to subscribe to DLQ");

    let dead_letter = tokio::time::timeout(Duration::from_secs(60), dlq.stream().next())
        .await
        .expect("No dead letter within timeout")
        .expect("DLQ stream ended")
        .expect("DLQ receive failed");

    assert_eq!(dead_letter.key(), Some(&b"2"[..]));
    let header = dead_letter
        .headers()
        .and_then(|headers| headers.iter().find(|h| h.key == DLQ_ERROR_HEADER))
        .expect("Missing error header");
    assert!(
        String::from_utf8_lossy(header.value.unwrap()).contains("Malformed event")
    );

    let stored = tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            if let Some(record) = store.get(OrderId::new(1)) {
                return record;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await
    .expect("Order was not ingested");
    assert_eq!(stored.customer_id, CustomerId::new(2));
    assert_eq!(stored.total, dec!(2500.0));
    assert!(store.get(OrderId::new(2)).is_none());

    trigger.trigger();
    task.await.unwrap().expect("Consumer should stop cleanly");
}
