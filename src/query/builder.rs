//! Result Builder
//!
//! Converts raw store responses into rows. Every value becomes its own row
//! holding a single `{column, value}` pair, walked column by column:
//!
//! ```text
//! columns [a, b], values [[1, 2], [3, 4]]
//!   -> {a:1} {a:3} {b:2} {b:4}
//! ```
//!
//! Downstream consumers index rows by this shape, so it is kept as is.

use crate::query::types::{Pair, Row};
use crate::store::RawResultSet;
use serde_json::Value;

/// Fan a column/value grid out into one row per value.
///
/// Columns without values produce nothing. A row shorter than `columns`
/// simply contributes no value for the missing columns.
pub fn build_rows(columns: &[String], values: &[Vec<Value>]) -> Vec<Row> {
    let mut rows = Vec::with_capacity(columns.len() * values.len());

    for (index, column) in columns.iter().enumerate() {
        for record in values {
            if let Some(value) = record.get(index) {
                rows.push(Row::single(Pair::new(column.clone(), stringify_value(value))));
            }
        }
    }

    rows
}

/// Build rows from every series of a raw response, in series order
pub fn rows_from_result_set(result: &RawResultSet) -> Vec<Row> {
    result
        .series
        .iter()
        .filter(|series| !series.columns.is_empty())
        .flat_map(|series| build_rows(&series.columns, &series.values))
        .collect()
}

/// Render a raw value as text: strings unquoted, null empty, everything
/// else as its JSON text.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
