//! Wire decoding of "order created" payloads.
//!
//! Payloads are UTF-8 JSON using the producer's field names:
//!
//! ```json
//! { "codigoPedido": 1, "codigoCliente": 2,
//!   "itens": [{ "produto": "notebook", "quantidade": 1, "preco": 1000.0 }] }
//! ```
//!
//! Anything that does not decode is a [`OrderError::MalformedEvent`], the same
//! outcome as an event that decodes but fails validation.

use order_ledger_core::{OrderCreatedEvent, OrderError};

/// Decode one message payload.
///
/// # Errors
///
/// Returns [`OrderError::MalformedEvent`] if the payload is missing or is not a
/// well-formed event document.
pub fn decode_event(payload: Option<&[u8]>) -> Result<OrderCreatedEvent, OrderError> {
    let Some(payload) = payload else {
        return Err(OrderError::MalformedEvent(
            "message has no payload".to_string(),
        ));
    };

    serde_json::from_slice(payload)
        .map_err(|e| OrderError::MalformedEvent(format!("undecodable payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use order_ledger_core::{CustomerId, OrderId};
    use rust_decimal_macros::dec;

    #[test]
    fn test_decodes_wire_payload() {
        let payload = br#"{
            "codigoPedido": 1001,
            "codigoCliente": 1,
            "itens": [
                { "produto": "lapis", "quantidade": 100, "preco": 1.10 },
                { "produto": "caderno", "quantidade": 10, "preco": "1.00" }
            ]
        }"#;

        let event = decode_event(Some(payload)).unwrap();

        assert_eq!(event.order_id, OrderId::new(1001));
        assert_eq!(event.customer_id, CustomerId::new(1));
        assert_eq!(event.items.len(), 2);
        assert_eq!(event.items[0].unit_price, dec!(1.10));
        assert_eq!(event.items[1].unit_price, dec!(1.00));
    }

    #[test]
    fn test_keeps_every_digit_of_the_price() {
        let payload = br#"{"codigoPedido": 1, "codigoCliente": 2,
            "itens": [{ "produto": "ledger", "quantidade": 2, "preco": 12345678901234567.89 }]}"#;

        let event = decode_event(Some(payload)).unwrap();

        assert_eq!(event.items[0].unit_price, dec!(12345678901234567.89));
        assert_eq!(event.items[0].unit_price.scale(), 2);
    }

    #[test]
    fn test_missing_payload_is_malformed() {
        assert!(matches!(
            decode_event(None),
            Err(OrderError::MalformedEvent(_))
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        for payload in [&b"not json"[..], b"{}", br#"{"codigoPedido": "x"}"#, b""] {
            assert!(
                matches!(decode_event(Some(payload)), Err(OrderError::MalformedEvent(_))),
                "payload {:?} should be malformed",
                String::from_utf8_lossy(payload)
            );
        }
    }
}
