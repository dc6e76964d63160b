//! Aggregation pipeline value object.
//!
//! The read path needs "sum of `total` over all orders of one customer". Instead of a
//! fluent builder bound to one driver, the query is an explicit value: a collection name
//! plus an ordered list of [`Stage`]s. Store adapters translate it into their native
//! query language, and tests compare expected and actual pipelines by value.
//!
//! ```text
//! tb_orders ──► $match { customerId: X } ──► $group { _id: null, total: { $sum: "$total" } }
//! ```
//!
//! Field names are the logical document names (`orderId`, `customerId`, `total`), not
//! adapter column names.

use crate::error::StoreError;
use crate::order::{CustomerId, OrderRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the order collection/table.
pub const ORDERS_COLLECTION: &str = "tb_orders";

/// Logical field name of the order identifier.
pub const FIELD_ORDER_ID: &str = "orderId";

/// Logical field name of the customer identifier.
pub const FIELD_CUSTOMER_ID: &str = "customerId";

/// Logical field name of the order total.
pub const FIELD_TOTAL: &str = "total";

/// Filter predicate for a match stage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Criteria {
    /// `field == value`
    Eq {
        /// Logical field name
        field: String,
        /// Value the field must equal
        value: i64,
    },
}

impl Criteria {
    /// `field == value`
    #[must_use]
    pub fn eq(field: impl Into<String>, value: i64) -> Self {
        Self::Eq {
            field: field.into(),
            value,
        }
    }

    /// Evaluate this predicate against a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsupportedPipeline`] for a field that is not an integer
    /// identifier of [`OrderRecord`].
    pub fn matches(&self, record: &OrderRecord) -> Result<bool, StoreError> {
        match self {
            Self::Eq { field, value } => match field.as_str() {
                FIELD_CUSTOMER_ID => Ok(record.customer_id.get() == *value),
                FIELD_ORDER_ID => Ok(record.order_id.get() == *value),
                other => Err(StoreError::UnsupportedPipeline(format!(
                    "cannot filter on field '{other}'"
                ))),
            },
        }
    }
}

/// Group every matched document into one and sum a field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSum {
    /// Field to sum
    pub sum_field: String,
    /// Name of the output field holding the sum
    pub output_field: String,
}

impl GroupSum {
    /// Sum `sum_field` into `output_field`.
    #[must_use]
    pub fn new(sum_field: impl Into<String>, output_field: impl Into<String>) -> Self {
        Self {
            sum_field: sum_field.into(),
            output_field: output_field.into(),
        }
    }

    /// Read the summed field from a record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsupportedPipeline`] for a field that is not a decimal
    /// field of [`OrderRecord`].
    pub fn value_of(&self, record: &OrderRecord) -> Result<Decimal, StoreError> {
        match self.sum_field.as_str() {
            FIELD_TOTAL => Ok(record.total),
            other => Err(StoreError::UnsupportedPipeline(format!(
                "cannot sum field '{other}'"
            ))),
        }
    }
}

/// One stage of an [`AggregationPipeline`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// Keep only documents satisfying the predicate
    Match(Criteria),
    /// Collapse all documents into one, summing a field
    Group(GroupSum),
}

/// An ordered list of stages run against one collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationPipeline {
    collection: String,
    stages: Vec<Stage>,
}

impl AggregationPipeline {
    /// Start an empty pipeline on `collection`.
    #[must_use]
    pub fn on(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            stages: Vec::new(),
        }
    }

    /// Append a match stage.
    #[must_use]
    pub fn filter(mut self, criteria: Criteria) -> Self {
        self.stages.push(Stage::Match(criteria));
        self
    }

    /// Append a group-and-sum stage.
    #[must_use]
    pub fn group_sum(mut self, group: GroupSum) -> Self {
        self.stages.push(Stage::Group(group));
        self
    }

    /// Sum of `total` over every order of `customer_id`, output as `total`.
    #[must_use]
    pub fn total_by_customer(customer_id: CustomerId) -> Self {
        Self::on(ORDERS_COLLECTION)
            .filter(Criteria::eq(FIELD_CUSTOMER_ID, customer_id.get()))
            .group_sum(GroupSum::new(FIELD_TOTAL, FIELD_TOTAL))
    }

    /// Collection this pipeline runs against
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Stages in execution order
    #[must_use]
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run the pipeline over in-memory records.
    ///
    /// Returns `Ok(None)` when no record survives the match stages (no output
    /// document), mirroring what a document store returns for an empty group.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnsupportedPipeline`] if the pipeline does not end with
    /// exactly one group stage, or references an unknown field, and
    /// [`StoreError::Query`] if the sum overflows.
    pub fn evaluate<'a, I>(&self, records: I) -> Result<Option<Decimal>, StoreError>
    where
        I: IntoIterator<Item = &'a OrderRecord>,
    {
        let Some((Stage::Group(group), filters)) = self.stages.split_last() else {
            return Err(StoreError::UnsupportedPipeline(
                "pipeline must end with a group stage".to_string(),
            ));
        };

        let mut sum: Option<Decimal> = None;
        'records: for record in records {
            for stage in filters {
                match stage {
                    Stage::Match(criteria) => {
                        if !criteria.matches(record)? {
                            continue 'records;
                        }
                    }
                    Stage::Group(_) => {
                        return Err(StoreError::UnsupportedPipeline(
                            "only one group stage is supported".to_string(),
                        ));
                    }
                }
            }
            let value = group.value_of(record)?;
            let next = sum.unwrap_or(Decimal::ZERO).checked_add(value).ok_or_else(|| {
                StoreError::Query(format!("sum of \"{}\" overflows", group.sum_field))
            })?;
            sum = Some(next);
        }

        Ok(sum)
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eq { field, value } => write!(f, "{{ \"{field}\" : {value} }}"),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Match(criteria) => write!(f, "{{ \"$match\" : {criteria} }}"),
            Self::Group(group) => write!(
                f,
                "{{ \"$group\" : {{ \"_id\" : null, \"{}\" : {{ \"$sum\" : \"${}\" }} }} }}",
                group.output_field, group.sum_field
            ),
        }
    }
}

impl fmt::Display for AggregationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ \"aggregate\" : \"{}\", \"pipeline\" : [",
            self.collection
        )?;
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{stage}")?;
        }
        write!(f, "] }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderId;
    use rust_decimal_macros::dec;

    fn record(order_id: i64, customer_id: i64, total: Decimal) -> OrderRecord {
        OrderRecord {
            order_id: OrderId::new(order_id),
            customer_id: CustomerId::new(customer_id),
            total,
            items: vec![],
        }
    }

    #[test]
    fn test_total_by_customer_shape() {
        let pipeline = AggregationPipeline::total_by_customer(CustomerId::new(1));

        assert_eq!(pipeline.collection(), "tb_orders");
        assert_eq!(
            pipeline.stages(),
            &[
                Stage::Match(Criteria::eq("customerId", 1)),
                Stage::Group(GroupSum::new("total", "total")),
            ]
        );
    }

    #[test]
    fn test_display_is_stable() {
        let pipeline = AggregationPipeline::total_by_customer(CustomerId::new(1));

        assert_eq!(
            pipeline.to_string(),
            r#"{ "aggregate" : "tb_orders", "pipeline" : [{ "$match" : { "customerId" : 1 } }, { "$group" : { "_id" : null, "total" : { "$sum" : "$total" } } }] }"#
        );
    }

    #[test]
    fn test_evaluate_sums_matching_records() {
        let records = vec![
            record(1, 1, dec!(10.25)),
            record(2, 2, dec!(99)),
            record(3, 1, dec!(10.25)),
        ];

        let sum = AggregationPipeline::total_by_customer(CustomerId::new(1))
            .evaluate(&records)
            .unwrap();

        assert_eq!(sum, Some(dec!(20.50)));
    }

    #[test]
    fn test_evaluate_without_matches_yields_no_document() {
        let records = vec![record(1, 2, dec!(5))];

        let sum = AggregationPipeline::total_by_customer(CustomerId::new(1))
            .evaluate(&records)
            .unwrap();

        assert_eq!(sum, None);
    }

    #[test]
    fn test_evaluate_rejects_unknown_fields() {
        let pipeline = AggregationPipeline::on(ORDERS_COLLECTION)
            .filter(Criteria::eq("status", 1))
            .group_sum(GroupSum::new("total", "total"));

        let err = pipeline.evaluate(&[record(1, 1, dec!(1))]).unwrap_err();

        assert!(matches!(err, StoreError::UnsupportedPipeline(_)));
    }

    #[test]
    fn test_evaluate_reports_overflow() {
        let records = [record(1, 1, Decimal::MAX), record(2, 1, dec!(1))];

        let err = AggregationPipeline::total_by_customer(CustomerId::new(1))
            .evaluate(&records)
            .unwrap_err();

        assert!(matches!(err, StoreError::Query(_)));
    }

    #[test]
    fn test_evaluate_requires_group_stage() {
        let pipeline = AggregationPipeline::on(ORDERS_COLLECTION).filter(Criteria::eq("customerId", 1));
        let records: Vec<OrderRecord> = Vec::new();
        assert!(pipeline.evaluate(&records).is_err());
    }
}
