//! Ready-made events and records.
//!
//! The one- and two-item events carry the amounts used throughout the test suites:
//! a single notebook at 1000.0, and a notebook plus two tablets at 1250.0 (3500.0).

use order_ledger_core::{
    CustomerId, Decimal, OrderCreatedEvent, OrderId, OrderItem, OrderItemEvent, OrderRecord,
};

/// Price of the notebook in the standard fixtures.
pub const NOTEBOOK_PRICE: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

/// Price of one tablet in the standard fixtures.
pub const TABLET_PRICE: Decimal = Decimal::from_parts(1250, 0, 0, false, 0);

/// An event with one notebook (total 1000.0).
#[must_use]
pub fn order_created_with_one_item(order_id: i64, customer_id: i64) -> OrderCreatedEvent {
    OrderCreatedEvent::new(
        OrderId::new(order_id),
        CustomerId::new(customer_id),
        vec![OrderItemEvent::new("notebook", 1, NOTEBOOK_PRICE)],
    )
}

/// An event with a notebook and two tablets (total 3500.0).
#[must_use]
pub fn order_created_with_two_items(order_id: i64, customer_id: i64) -> OrderCreatedEvent {
    OrderCreatedEvent::new(
        OrderId::new(order_id),
        CustomerId::new(customer_id),
        vec![
            OrderItemEvent::new("notebook", 1, NOTEBOOK_PRICE),
            OrderItemEvent::new("tablet", 2, TABLET_PRICE),
        ],
    )
}

/// An event with the given `(product, quantity, unit price)` lines.
#[must_use]
pub fn order_created(
    order_id: i64,
    customer_id: i64,
    items: &[(&str, i32, Decimal)],
) -> OrderCreatedEvent {
    OrderCreatedEvent::new(
        OrderId::new(order_id),
        CustomerId::new(customer_id),
        items
            .iter()
            .map(|(product, quantity, price)| OrderItemEvent::new(*product, *quantity, *price))
            .collect(),
    )
}

/// A stored one-notebook record (total 1000.0).
#[must_use]
pub fn order_record(order_id: i64, customer_id: i64) -> OrderRecord {
    OrderRecord {
        order_id: OrderId::new(order_id),
        customer_id: CustomerId::new(customer_id),
        total: NOTEBOOK_PRICE,
        items: vec![OrderItem {
            product: "notebook".to_string(),
            quantity: 1,
            unit_price: NOTEBOOK_PRICE,
        }],
    }
}

/// A stored record with an arbitrary total and no line items.
#[must_use]
pub fn order_record_with_total(order_id: i64, customer_id: i64, total: Decimal) -> OrderRecord {
    OrderRecord {
        order_id: OrderId::new(order_id),
        customer_id: CustomerId::new(customer_id),
        total,
        items: Vec::new(),
    }
}
