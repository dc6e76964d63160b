//! Order data model.
//!
//! Two families of types live here:
//!
//! - **Inbound events** ([`OrderCreatedEvent`], [`OrderItemEvent`]) as they arrive from the
//!   upstream producer. Their serde names follow the producer's wire format
//!   (`codigoPedido`, `codigoCliente`, `itens`, `produto`, `quantidade`, `preco`).
//! - **Persisted records** ([`OrderRecord`], [`OrderItem`]) and the read-side projection
//!   [`OrderSummaryView`].
//!
//! All types are immutable values with equality by value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for an order (primary key of the order record store).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(i64);

impl OrderId {
    /// Create a new `OrderId`
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a customer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(i64);

impl CustomerId {
    /// Create a new `CustomerId`
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw identifier
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line item as carried by an inbound [`OrderCreatedEvent`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemEvent {
    /// Product name
    #[serde(rename = "produto")]
    pub product: String,
    /// Units ordered (must be at least 1)
    #[serde(rename = "quantidade")]
    pub quantity: i32,
    /// Price per unit (must not be negative)
    #[serde(rename = "preco", with = "rust_decimal::serde::arbitrary_precision")]
    pub unit_price: Decimal,
}

impl OrderItemEvent {
    /// Create a new line item event.
    #[must_use]
    pub fn new(product: impl Into<String>, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            product: product.into(),
            quantity,
            unit_price,
        }
    }
}

/// The unit of ingestion: an order was created upstream.
///
/// # Wire format
///
/// ```json
/// {
///   "codigoPedido": 1,
///   "codigoCliente": 2,
///   "itens": [{ "produto": "notebook", "quantidade": 1, "preco": 1000.0 }]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    /// Order identifier assigned by the producer
    #[serde(rename = "codigoPedido")]
    pub order_id: OrderId,
    /// Customer who placed the order
    #[serde(rename = "codigoCliente")]
    pub customer_id: CustomerId,
    /// Ordered line items (must not be empty)
    #[serde(rename = "itens")]
    pub items: Vec<OrderItemEvent>,
}

impl OrderCreatedEvent {
    /// Create a new order created event.
    #[must_use]
    pub const fn new(order_id: OrderId, customer_id: CustomerId, items: Vec<OrderItemEvent>) -> Self {
        Self {
            order_id,
            customer_id,
            items,
        }
    }
}

/// A line item owned by a persisted [`OrderRecord`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product name
    pub product: String,
    /// Units ordered
    pub quantity: i32,
    /// Price per unit
    pub unit_price: Decimal,
}

impl OrderItem {
    /// Line subtotal (`unit_price × quantity`), exact decimal arithmetic. `None` on overflow.
    #[must_use]
    pub fn subtotal(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}

impl From<&OrderItemEvent> for OrderItem {
    fn from(item: &OrderItemEvent) -> Self {
        Self {
            product: item.product.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }
}

/// A persisted order.
///
/// `total` is computed once by the mapper and trusted thereafter; nothing in this
/// crate recomputes it on read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Primary key
    pub order_id: OrderId,
    /// Owning customer
    pub customer_id: CustomerId,
    /// Σ(unit price × quantity) over `items`
    pub total: Decimal,
    /// Line items in event order
    pub items: Vec<OrderItem>,
}

impl OrderRecord {
    /// Project this record into its read-side summary.
    #[must_use]
    pub const fn summary(&self) -> OrderSummaryView {
        OrderSummaryView {
            order_id: self.order_id,
            customer_id: self.customer_id,
            total: self.total,
        }
    }
}

/// Read-side projection of an [`OrderRecord`]. Derived, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummaryView {
    /// Order identifier
    pub order_id: OrderId,
    /// Customer identifier
    pub customer_id: CustomerId,
    /// Order total
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total: Decimal,
}

impl From<&OrderRecord> for OrderSummaryView {
    fn from(record: &OrderRecord) -> Self {
        record.summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_event_deserializes_from_wire_names() {
        let json = r#"{
            "codigoPedido": 1,
            "codigoCliente": 2,
            "itens": [{ "produto": "notebook", "quantidade": 1, "preco": 1000.0 }]
        }"#;

        let event: OrderCreatedEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.order_id, OrderId::new(1));
        assert_eq!(event.customer_id, CustomerId::new(2));
        assert_eq!(event.items.len(), 1);
        assert_eq!(event.items[0].product, "notebook");
        assert_eq!(event.items[0].quantity, 1);
        assert_eq!(event.items[0].unit_price, dec!(1000));
    }

    #[test]
    fn test_event_accepts_string_prices() {
        let json = r#"{"codigoPedido": 7, "codigoCliente": 3,
                       "itens": [{"produto": "pen", "quantidade": 3, "preco": "0.10"}]}"#;

        let event: OrderCreatedEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.items[0].unit_price, dec!(0.10));
    }

    #[test]
    fn test_item_subtotal_is_exact() {
        let item = OrderItem {
            product: "pen".to_string(),
            quantity: 3,
            unit_price: dec!(0.1),
        };
        assert_eq!(item.subtotal(), Some(dec!(0.3)));
    }

    #[test]
    fn test_summary_view_serializes_camel_case() {
        let view = OrderSummaryView {
            order_id: OrderId::new(1),
            customer_id: CustomerId::new(2),
            total: dec!(20.50),
        };

        let json = serde_json::to_value(view).unwrap();

        assert_eq!(json["orderId"], serde_json::json!(1));
        assert_eq!(json["customerId"], serde_json::json!(2));
        assert_eq!(json["total"].to_string(), "20.50");
    }

    #[test]
    fn test_high_precision_price_is_exact_on_the_wire() {
        let json = r#"{"codigoPedido": 1, "codigoCliente": 2,
                       "itens": [{"produto": "ledger", "quantidade": 1, "preco": 12345678901234567.89}]}"#;

        let event: OrderCreatedEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.items[0].unit_price, dec!(12345678901234567.89));

        let encoded = serde_json::to_string(&event).unwrap();
        assert!(encoded.contains(r#""preco":12345678901234567.89"#));
        let decoded: OrderCreatedEvent = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, event);
    }
}
