//! Translation of [`AggregationPipeline`] values into SQL.
//!
//! ```text
//! $match { customerId: 2 }               WHERE customer_id = $1
//! $group { _id: null,          ──►       SELECT SUM(total) AS "total"
//!          total: { $sum: "$total" } }   FROM tb_orders
//! ```
//!
//! Only the shapes the order ledger issues are supported: any number of equality
//! matches on identifier columns followed by exactly one group-sum over a decimal
//! column. Anything else is rejected with [`StoreError::UnsupportedPipeline`] rather
//! than guessed at.

use order_ledger_core::aggregation::{FIELD_CUSTOMER_ID, FIELD_ORDER_ID, FIELD_TOTAL};
use order_ledger_core::{AggregationPipeline, Criteria, StoreError, Stage};

/// A parameterised `SELECT SUM(..)` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumQuery {
    /// SQL text with `$n` placeholders
    pub sql: String,
    /// Values bound to `$1..$n`, in order
    pub params: Vec<i64>,
}

/// Column holding a filterable identifier field.
fn filter_column(field: &str) -> Result<&'static str, StoreError> {
    match field {
        FIELD_CUSTOMER_ID => Ok("customer_id"),
        FIELD_ORDER_ID => Ok("order_id"),
        other => Err(StoreError::UnsupportedPipeline(format!(
            "cannot filter on field '{other}'"
        ))),
    }
}

/// Column holding a summable decimal field.
fn sum_column(field: &str) -> Result<&'static str, StoreError> {
    match field {
        FIELD_TOTAL => Ok("total"),
        other => Err(StoreError::UnsupportedPipeline(format!(
            "cannot sum field '{other}'"
        ))),
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}

/// Translate `pipeline` into a sum query against `table`.
///
/// # Errors
///
/// Returns [`StoreError::UnsupportedPipeline`] if the pipeline does not end with exactly
/// one group stage, references an unknown field, or names an output field that is not
/// a plain identifier.
pub fn translate(pipeline: &AggregationPipeline, table: &str) -> Result<SumQuery, StoreError> {
    let Some((Stage::Group(group), filters)) = pipeline.stages().split_last() else {
        return Err(StoreError::UnsupportedPipeline(
            "pipeline must end with a group stage".to_string(),
        ));
    };

    if !is_identifier(table) {
        return Err(StoreError::UnsupportedPipeline(format!(
            "invalid table name '{table}'"
        )));
    }
    if !is_identifier(&group.output_field) {
        return Err(StoreError::UnsupportedPipeline(format!(
            "invalid output field '{}'",
            group.output_field
        )));
    }

    let mut conditions = Vec::with_capacity(filters.len());
    let mut params = Vec::with_capacity(filters.len());
    for stage in filters {
        match stage {
            Stage::Match(Criteria::Eq { field, value }) => {
                params.push(*value);
                conditions.push(format!("{} = ${}", filter_column(field)?, params.len()));
            }
            Stage::Group(_) => {
                return Err(StoreError::UnsupportedPipeline(
                    "only one group stage is supported".to_string(),
                ));
            }
        }
    }

    let mut sql = format!(
        "SELECT SUM({}) AS \"{}\" FROM {table}",
        sum_column(&group.sum_field)?,
        group.output_field
    );
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }

    Ok(SumQuery { sql, params })
}
