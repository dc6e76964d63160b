//! Kafka-compatible consumer feeding the ingestion service.

use crate::handler::{OrderEventHandler, settle};
use crate::{ConsumerError, DLQ_ERROR_HEADER, DeadLetterSink};
use futures::StreamExt;
use order_ledger_core::OrderStore;
use order_ledger_runtime::ShutdownSignal;
use order_ledger_runtime::metrics::ConsumerMetrics;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{Header, Message, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::{Duration, Instant};

/// Publishes rejected payloads to the dead letter topic.
///
/// The original key and payload are kept as-is; the rejection reason travels in the
/// [`DLQ_ERROR_HEADER`] header.
pub struct KafkaDeadLetterSink {
    producer: FutureProducer,
    topic: String,
    timeout: Duration,
}

impl KafkaDeadLetterSink {
    /// Sink writing to `topic` through `producer`.
    #[must_use]
    pub const fn new(producer: FutureProducer, topic: String, timeout: Duration) -> Self {
        Self {
            producer,
            topic,
            timeout,
        }
    }

    /// The dead letter topic
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl DeadLetterSink for KafkaDeadLetterSink {
    async fn publish(
        &self,
        key: Option<&[u8]>,
        payload: &[u8],
        reason: &str,
    ) -> Result<(), ConsumerError> {
        let headers = OwnedHeaders::new().insert(Header {
            key: DLQ_ERROR_HEADER,
            value: Some(reason),
        });
        let mut record = FutureRecord::to(&self.topic)
            .payload(payload)
            .headers(headers);
        if let Some(key) = key {
            record = record.key(key);
        }

        match self.producer.send(record, Timeout::After(self.timeout)).await {
            Ok((partition, offset)) => {
                tracing::warn!(
                    topic = %self.topic,
                    partition,
                    offset,
                    reason,
                    "Order payload dead-lettered"
                );
                Ok(())
            }
            Err((kafka_error, _)) => Err(ConsumerError::DeadLetter(format!(
                "Failed to publish to {}: {kafka_error}",
                self.topic
            ))),
        }
    }
}

/// Consumes "order created" events with at-least-once delivery.
///
/// Offsets are committed manually, and only after a message has either been
/// ingested or handed to the dead letter topic. A message whose ingestion keeps
/// failing is left uncommitted and [`run`](Self::run) returns, so the message is
/// redelivered once the consumer group rebalances or the process restarts.
///
/// # Example
///
/// ```no_run
/// use order_ledger_redpanda::OrderEventConsumer;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let consumer = OrderEventConsumer::builder()
///     .brokers("localhost:9092")
///     .topic("order-created")
///     .dead_letter_topic("order-created-dlq")
///     .consumer_group("order-ledger")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct OrderEventConsumer {
    consumer: StreamConsumer,
    dead_letters: KafkaDeadLetterSink,
    topic: String,
}

impl OrderEventConsumer {
    /// Create a builder for configuring the consumer.
    #[must_use]
    pub fn builder() -> OrderEventConsumerBuilder {
        OrderEventConsumerBuilder::default()
    }

    /// The subscribed topic
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Consume until `shutdown` fires or a message cannot be settled.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Halted`] when a message is left uncommitted.
    pub async fn run<S: OrderStore>(
        self,
        handler: OrderEventHandler<S>,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), ConsumerError> {
        let mut stream = self.consumer.stream();

        tracing::info!(topic = %self.topic, dead_letter_topic = %self.dead_letters.topic(), "Order consumer started");

        loop {
            let message = tokio::select! {
                () = shutdown.wait() => {
                    tracing::info!(topic = %self.topic, "Order consumer stopping");
                    return Ok(());
                }
                next = stream.next() => match next {
                    Some(Ok(message)) => message,
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Failed to receive message");
                        continue;
                    }
                    None => return Ok(()),
                },
            };

            let started = Instant::now();
            tracing::trace!(
                topic = message.topic(),
                partition = message.partition(),
                offset = message.offset(),
                "Received order message"
            );

            let disposition = handler.handle(message.payload()).await;
            let settlement =
                settle(&self.dead_letters, disposition, message.key(), message.payload()).await;
            ConsumerMetrics::record_message(started.elapsed());

            if let Err(err) = settlement.into_result() {
                tracing::error!(
                    topic = message.topic(),
                    partition = message.partition(),
                    offset = message.offset(),
                    error = %err,
                    "Leaving message uncommitted and stopping consumer"
                );
                return Err(err);
            }

            if let Err(e) = self.consumer.commit_message(&message, CommitMode::Async) {
                tracing::warn!(
                    topic = message.topic(),
                    partition = message.partition(),
                    offset = message.offset(),
                    error = %e,
                    "Failed to commit offset (message may be redelivered)"
                );
            }
        }
    }
}

/// Builder for [`OrderEventConsumer`].
#[derive(Default)]
pub struct OrderEventConsumerBuilder {
    brokers: Option<String>,
    topic: Option<String>,
    dead_letter_topic: Option<String>,
    consumer_group: Option<String>,
    auto_offset_reset: Option<String>,
    timeout: Option<Duration>,
}

impl OrderEventConsumerBuilder {
    /// Set broker addresses (comma-separated).
    #[must_use]
    pub fn brokers(mut self, brokers: impl Into<String>) -> Self {
        self.brokers = Some(brokers.into());
        self
    }

    /// Topic carrying "order created" events (default: `order-created`).
    #[must_use]
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = Some(topic.into());
        self
    }

    /// Topic rejected payloads are published to (default: `<topic>-dlq`).
    #[must_use]
    pub fn dead_letter_topic(mut self, topic: impl Into<String>) -> Self {
        self.dead_letter_topic = Some(topic.into());
        self
    }

    /// Consumer group id (default: `order-ledger`).
    #[must_use]
    pub fn consumer_group(mut self, group: impl Into<String>) -> Self {
        self.consumer_group = Some(group.into());
        self
    }

    /// Where a new consumer group starts reading (default: `earliest`).
    #[must_use]
    pub fn auto_offset_reset(mut self, policy: impl Into<String>) -> Self {
        self.auto_offset_reset = Some(policy.into());
        self
    }

    /// Dead letter publish timeout (default: 5 seconds).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Create the consumer and dead letter producer and subscribe.
    ///
    /// # Errors
    ///
    /// Returns [`ConsumerError::Connection`] if brokers are missing or a client cannot
    /// be created, and [`ConsumerError::Subscription`] if subscribing fails.
    pub fn build(self) -> Result<OrderEventConsumer, ConsumerError> {
        let brokers = self
            .brokers
            .ok_or_else(|| ConsumerError::Connection("Brokers not configured".to_string()))?;
        let topic = self.topic.unwrap_or_else(|| "order-created".to_string());
        let dead_letter_topic = self
            .dead_letter_topic
            .unwrap_or_else(|| format!("{topic}-dlq"));
        let consumer_group = self
            .consumer_group
            .unwrap_or_else(|| "order-ledger".to_string());
        let auto_offset_reset = self
            .auto_offset_reset
            .unwrap_or_else(|| "earliest".to_string());

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &brokers)
            .set("group.id", &consumer_group)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", &auto_offset_reset)
            .set("session.timeout.ms", "6000")
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| ConsumerError::Connection(format!("Failed to create consumer: {e}")))?;

        consumer
            .subscribe(&[topic.as_str()])
            .map_err(|e| ConsumerError::Subscription {
                topic: topic.clone(),
                reason: e.to_string(),
            })?;

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &brokers)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .create()
            .map_err(|e| ConsumerError::Connection(format!("Failed to create producer: {e}")))?;

        tracing::info!(
            brokers = %brokers,
            topic = %topic,
            dead_letter_topic = %dead_letter_topic,
            consumer_group = %consumer_group,
            auto_offset_reset = %auto_offset_reset,
            manual_commit = true,
            "OrderEventConsumer created"
        );

        Ok(OrderEventConsumer {
            consumer,
            dead_letters: KafkaDeadLetterSink::new(
                producer,
                dead_letter_topic,
                self.timeout.unwrap_or(Duration::from_secs(5)),
            ),
            topic,
        })
    }
}
