//! Event-to-record mapping.
//!
//! [`map_event`] is a pure function: it validates an [`OrderCreatedEvent`], copies its
//! identifiers and line items, and computes the order total with exact decimal
//! arithmetic. It performs no I/O.

use crate::error::{OrderError, Result};
use crate::order::{OrderCreatedEvent, OrderItem, OrderItemEvent, OrderRecord};
use rust_decimal::Decimal;

/// Translate an inbound event into the record to persist.
///
/// # Errors
///
/// Returns [`OrderError::MalformedEvent`] if the event has no items, or any item has
/// a blank product, a quantity below 1, or a negative unit price, and when the total
/// does not fit in a [`Decimal`].
pub fn map_event(event: &OrderCreatedEvent) -> Result<OrderRecord> {
    validate(event)?;

    let items: Vec<OrderItem> = event.items.iter().map(OrderItem::from).collect();
    let total = order_total(&items).ok_or_else(|| {
        OrderError::MalformedEvent(format!("order {} total overflows", event.order_id))
    })?;

    Ok(OrderRecord {
        order_id: event.order_id,
        customer_id: event.customer_id,
        total,
        items,
    })
}

/// Σ(unit price × quantity), summed in item order. `None` on overflow.
#[must_use]
pub fn order_total(items: &[OrderItem]) -> Option<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |total, item| {
        total.checked_add(item.subtotal()?)
    })
}

fn validate(event: &OrderCreatedEvent) -> Result<()> {
    if event.items.is_empty() {
        return Err(OrderError::MalformedEvent(format!(
            "order {} has no items",
            event.order_id
        )));
    }

    for (index, item) in event.items.iter().enumerate() {
        validate_item(event, index, item)?;
    }

    Ok(())
}

fn validate_item(event: &OrderCreatedEvent, index: usize, item: &OrderItemEvent) -> Result<()> {
    if item.product.trim().is_empty() {
        return Err(OrderError::MalformedEvent(format!(
            "order {} item {index} has no product",
            event.order_id
        )));
    }
    if item.quantity < 1 {
        return Err(OrderError::MalformedEvent(format!(
            "order {} item {index} has quantity {}",
            event.order_id, item.quantity
        )));
    }
    if item.unit_price < Decimal::ZERO {
        return Err(OrderError::MalformedEvent(format!(
            "order {} item {index} has negative unit price {}",
            event.order_id, item.unit_price
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{CustomerId, OrderId};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn event_with(items: Vec<OrderItemEvent>) -> OrderCreatedEvent {
        OrderCreatedEvent::new(OrderId::new(1), CustomerId::new(2), items)
    }

    #[test]
    fn test_maps_single_item_event() {
        let event = event_with(vec![OrderItemEvent::new("notebook", 1, dec!(1000.0))]);

        let record = map_event(&event).unwrap();

        assert_eq!(record.order_id, OrderId::new(1));
        assert_eq!(record.customer_id, CustomerId::new(2));
        assert_eq!(record.total, dec!(1000.0));
        assert_eq!(record.items.len(), 1);
        assert_eq!(record.items[0].product, "notebook");
        assert_eq!(record.items[0].quantity, 1);
        assert_eq!(record.items[0].unit_price, dec!(1000.0));
    }

    #[test]
    fn test_sums_two_items() {
        let event = event_with(vec![
            OrderItemEvent::new("notebook", 1, dec!(1000.0)),
            OrderItemEvent::new("desktop", 1, dec!(2500.0)),
        ]);

        let record = map_event(&event).unwrap();

        assert_eq!(record.total, dec!(3500.0));
    }

    #[test]
    fn test_multiplies_by_quantity_without_drift() {
        let event = event_with(vec![
            OrderItemEvent::new("pen", 3, dec!(0.1)),
            OrderItemEvent::new("clip", 7, dec!(0.07)),
        ]);

        let record = map_event(&event).unwrap();

        assert_eq!(record.total, dec!(0.79));
    }

    #[test]
    fn test_free_items_are_allowed() {
        let event = event_with(vec![OrderItemEvent::new("sticker", 2, dec!(0))]);
        assert_eq!(map_event(&event).unwrap().total, dec!(0));
    }

    #[test]
    fn test_empty_items_rejected() {
        let err = map_event(&event_with(vec![])).unwrap_err();
        assert!(matches!(err, OrderError::MalformedEvent(_)));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let event = event_with(vec![OrderItemEvent::new("notebook", 0, dec!(1))]);
        assert!(matches!(map_event(&event), Err(OrderError::MalformedEvent(_))));
    }

    #[test]
    fn test_negative_price_rejected() {
        let event = event_with(vec![OrderItemEvent::new("notebook", 1, dec!(-0.01))]);
        assert!(matches!(map_event(&event), Err(OrderError::MalformedEvent(_))));
    }

    #[test]
    fn test_blank_product_rejected() {
        let event = event_with(vec![OrderItemEvent::new("  ", 1, dec!(1))]);
        assert!(matches!(map_event(&event), Err(OrderError::MalformedEvent(_))));
    }

    #[test]
    fn test_overflowing_total_rejected() {
        let event = event_with(vec![
            OrderItemEvent::new("yacht", 1, Decimal::MAX),
            OrderItemEvent::new("dinghy", 1, dec!(1)),
        ]);
        assert!(matches!(map_event(&event), Err(OrderError::MalformedEvent(_))));
    }

    fn item_strategy() -> impl Strategy<Value = OrderItemEvent> {
        (1i32..1_000, 0i64..100_000_000_000_000_000, 0u32..10).prop_map(|(quantity, mantissa, scale)| {
            OrderItemEvent::new("item", quantity, Decimal::new(mantissa, scale))
        })
    }

    proptest! {
        #[test]
        fn prop_total_is_sum_of_subtotals(items in prop::collection::vec(item_strategy(), 1..20)) {
            let record = map_event(&event_with(items.clone())).unwrap();

            let expected: Decimal = items
                .iter()
                .map(|i| i.unit_price * Decimal::from(i.quantity))
                .sum();
            prop_assert_eq!(record.total, expected);

            let mut reversed = items;
            reversed.reverse();
            let reversed_total = map_event(&event_with(reversed)).unwrap().total;
            prop_assert_eq!(record.total, reversed_total);
        }

        #[test]
        fn prop_total_survives_the_wire(items in prop::collection::vec(item_strategy(), 1..20)) {
            let event = event_with(items);
            let json = serde_json::to_string(&event).unwrap();
            let decoded: OrderCreatedEvent = serde_json::from_str(&json).unwrap();

            prop_assert_eq!(&decoded, &event);
            prop_assert_eq!(map_event(&decoded).unwrap().total, map_event(&event).unwrap().total);
        }
    }
}
