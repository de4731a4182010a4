//! Column access helpers shared by the built-in transformations.

use polars::prelude::*;

use chrono::NaiveDateTime;
use tabfuse_model::Table;
use tabfuse_model::value::{any_to_datetime, any_to_f64, any_to_string};

use crate::datetime::{parse_datetime, parse_with_format};
use crate::error::{Result, TransformError};

/// Look up a column, mapping the miss to the user-facing error.
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map(Column::as_materialized_series)
        .map_err(|_| TransformError::ColumnNotFound {
            column: name.to_string(),
        })
}

/// Coerce every cell to f64. Unparseable and null cells become `None`.
pub fn coerce_numeric(series: &Series) -> Vec<Option<f64>> {
    (0..series.len())
        .map(|i| any_to_f64(&series.get(i).unwrap_or(AnyValue::Null)))
        .collect()
}

/// Stringify every cell, keeping nulls as `None`.
pub fn string_values(series: &Series) -> Vec<Option<String>> {
    (0..series.len())
        .map(|i| match series.get(i).unwrap_or(AnyValue::Null) {
            AnyValue::Null => None,
            value => Some(any_to_string(value)),
        })
        .collect()
}

/// Read every cell as a timestamp.
///
/// Temporal columns convert directly. Anything else is stringified and
/// parsed, either with the supplied chrono format or by auto-detection.
/// Cells that do not parse become `None`.
pub fn datetime_values(series: &Series, format: Option<&str>) -> Vec<Option<NaiveDateTime>> {
    let temporal = matches!(series.dtype(), DataType::Date | DataType::Datetime(_, _));
    (0..series.len())
        .map(|i| {
            let value = series.get(i).unwrap_or(AnyValue::Null);
            if temporal {
                return any_to_datetime(&value);
            }
            match value {
                AnyValue::Null => None,
                other => {
                    let text = any_to_string(other);
                    match format {
                        Some(fmt) => parse_with_format(&text, fmt),
                        None => parse_datetime(&text),
                    }
                }
            }
        })
        .collect()
}

/// Clone the table with one column replaced or appended.
pub fn with_series(table: &Table, series: Series) -> Result<Table> {
    let mut df = table.data.clone();
    df.with_column(series)?;
    Ok(Table::new(table.label.clone(), df))
}

/// Resolve an output column name, rejecting blank input.
pub fn target_name(value: Option<&str>) -> Result<String> {
    match value.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(TransformError::EmptyTargetName),
    }
}
