//! Column-level batch operations: type conversion, value replacement, row
//! filtering, renames, and drops.

use polars::prelude::*;
use serde_json::Value;

use tabfuse_model::Table;
use tabfuse_model::value::{parse_bool, parse_f64};

use crate::data_utils::{
    coerce_numeric, datetime_values, require_column, string_values, with_series,
};
use crate::error::{Result, TransformError};
use crate::param::{ParamKind, ParamSpec, Params};
use crate::registry::Transform;

const TARGET_TYPES: &[&str] = &["string", "number", "datetime", "boolean"];

/// Convert a column to another type with coerce semantics: cells that do
/// not convert become missing.
pub struct ConvertType;

impl Transform for ConvertType {
    fn name(&self) -> &'static str {
        "convert_type"
    }

    fn description(&self) -> &'static str {
        "Convert a column to text, number, timestamp, or boolean"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("column", "Column", ParamKind::Column),
            ParamSpec::required("type", "Target Type", ParamKind::Select)
                .with_options(TARGET_TYPES),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let column = params.required_str("column", "Column")?;
        let target_type = params.required_str("type", "Target Type")?;

        let series = require_column(&table.data, column)?;
        let converted = match target_type {
            "string" => Series::new(column.into(), string_values(series)),
            "number" => Series::new(column.into(), coerce_numeric(series)),
            "datetime" => Series::new(column.into(), datetime_values(series, None)),
            _ => {
                let values: Vec<Option<bool>> = string_values(series)
                    .iter()
                    .map(|cell| cell.as_deref().and_then(parse_bool))
                    .collect();
                Series::new(column.into(), values)
            }
        };
        with_series(table, converted)
    }
}

/// Replace whole-cell matches of one literal value with another.
pub struct ReplaceValues;

impl Transform for ReplaceValues {
    fn name(&self) -> &'static str {
        "replace_values"
    }

    fn description(&self) -> &'static str {
        "Replace one literal value with another within a column"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("column", "Column", ParamKind::Column),
            ParamSpec::required("find", "Value to Find", ParamKind::Text),
            ParamSpec::required("replace", "Replacement", ParamKind::Text)
                .with_default(Value::String(String::new())),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let column = params.required_str("column", "Column")?;
        let find = params.required_str("find", "Value to Find")?;
        let replace = params.str("replace").unwrap_or("");

        let strings = string_values(require_column(&table.data, column)?);
        let mut matched = false;
        let values: Vec<Option<String>> = strings
            .iter()
            .map(|cell| {
                cell.as_deref().map(|text| {
                    if text == find {
                        matched = true;
                        replace.to_string()
                    } else {
                        text.to_string()
                    }
                })
            })
            .collect();

        // No match leaves the column (and its dtype) untouched.
        if !matched {
            return Ok(table.clone());
        }
        with_series(table, Series::new(column.into(), values))
    }
}

const FILTER_TYPES: &[&str] = &[
    "equals",
    "not_equals",
    "contains",
    "greater_than",
    "less_than",
];

/// Keep rows where a column matches a literal. Comparisons are numeric when
/// both sides parse as numbers, lexical otherwise.
pub struct FilterRows;

impl Transform for FilterRows {
    fn name(&self) -> &'static str {
        "filter_rows"
    }

    fn description(&self) -> &'static str {
        "Keep rows where a column matches a condition"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("column", "Column", ParamKind::Column),
            ParamSpec::required("filter_type", "Condition", ParamKind::Select)
                .with_options(FILTER_TYPES),
            ParamSpec::required("value", "Value", ParamKind::Text),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let column = params.required_str("column", "Column")?;
        let filter_type = params.required_str("filter_type", "Condition")?;
        let value = params.required_str("value", "Value")?;

        let series = require_column(&table.data, column)?;
        let strings = string_values(series);
        let numbers = coerce_numeric(series);
        let value_num = parse_f64(value);

        let keep: Vec<bool> = strings
            .iter()
            .zip(numbers.iter())
            .map(|(text, number)| {
                let equal = match (number, value_num) {
                    (Some(n), Some(v)) => *n == v,
                    _ => text.as_deref() == Some(value),
                };
                match filter_type {
                    "equals" => equal,
                    "not_equals" => !equal,
                    "contains" => text.as_deref().is_some_and(|t| t.contains(value)),
                    "greater_than" => match value_num {
                        Some(v) => number.is_some_and(|n| n > v),
                        None => text.as_deref().is_some_and(|t| t > value),
                    },
                    _ => match value_num {
                        Some(v) => number.is_some_and(|n| n < v),
                        None => text.as_deref().is_some_and(|t| t < value),
                    },
                }
            })
            .collect();

        let mask = BooleanChunked::from_slice(PlSmallStr::EMPTY, &keep);
        let filtered = table.data.filter(&mask)?;
        Ok(Table::new(table.label.clone(), filtered))
    }
}

/// Rename columns from an old-name to new-name mapping. Names that are not
/// present are skipped.
pub struct RenameColumns;

impl Transform for RenameColumns {
    fn name(&self) -> &'static str {
        "rename_columns"
    }

    fn description(&self) -> &'static str {
        "Rename columns using an old-to-new name mapping"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![ParamSpec::required("mapping", "Column Mapping", ParamKind::Map)]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let mapping = params.map("mapping").ok_or(TransformError::MissingParameter {
            label: "Column Mapping".to_string(),
        })?;

        let mut df = table.data.clone();
        for (old, new) in mapping {
            let Some(new) = new.as_str().map(str::trim).filter(|s| !s.is_empty()) else {
                continue;
            };
            if df.column(old).is_err() || old == new {
                continue;
            }
            df.rename(old, new.into())?;
        }
        Ok(Table::new(table.label.clone(), df))
    }
}

/// Drop the listed columns. Names that are not present are skipped.
pub struct DropColumns;

impl Transform for DropColumns {
    fn name(&self) -> &'static str {
        "drop_columns"
    }

    fn description(&self) -> &'static str {
        "Remove the listed columns from the table"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("columns", "Columns to Drop", ParamKind::Text)
                .with_help("Comma-separated column names"),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let raw = params.required_str("columns", "Columns to Drop")?;
        let drop: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect();

        let kept: Vec<String> = table
            .column_names()
            .into_iter()
            .filter(|name| !drop.contains(&name.as_str()))
            .collect();
        if kept.len() == table.column_count() {
            return Ok(table.clone());
        }
        let df = table.data.select(kept)?;
        Ok(Table::new(table.label.clone(), df))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tabfuse_model::value::any_to_string;

    use super::*;

    fn table(df: DataFrame) -> Table {
        Table::new("t.csv", df)
    }

    fn validated(transform: &dyn Transform, raw: serde_json::Value, table: &Table) -> Params {
        Params::validate(&transform.parameters(), raw.as_object().unwrap(), table).unwrap()
    }

    fn column_strings(table: &Table, name: &str) -> Vec<String> {
        let series = table.data.column(name).unwrap().as_materialized_series();
        (0..series.len())
            .map(|i| any_to_string(series.get(i).unwrap()))
            .collect()
    }

    #[test]
    fn test_convert_to_number_coerces_failures() {
        let t = table(df!("v" => ["1.5", "x", ""]).unwrap());
        let params = validated(&ConvertType, json!({"column": "v", "type": "number"}), &t);
        let out = ConvertType.apply(&t, &params).unwrap();
        assert_eq!(out.data.column("v").unwrap().dtype(), &DataType::Float64);
        assert_eq!(out.data.column("v").unwrap().null_count(), 2);
    }

    #[test]
    fn test_convert_to_boolean() {
        let t = table(df!("v" => ["yes", "No", "1", "maybe"]).unwrap());
        let params = validated(&ConvertType, json!({"column": "v", "type": "boolean"}), &t);
        let out = ConvertType.apply(&t, &params).unwrap();
        assert_eq!(out.data.column("v").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(
            column_strings(&out, "v"),
            vec!["true", "false", "true", ""]
        );
    }

    #[test]
    fn test_convert_to_datetime() {
        let t = table(df!("v" => ["2024-01-15", "bad"]).unwrap());
        let params = validated(&ConvertType, json!({"column": "v", "type": "datetime"}), &t);
        let out = ConvertType.apply(&t, &params).unwrap();
        assert!(matches!(
            out.data.column("v").unwrap().dtype(),
            DataType::Datetime(_, _)
        ));
        assert_eq!(out.data.column("v").unwrap().null_count(), 1);
    }

    #[test]
    fn test_replace_values_whole_cell_only() {
        let t = table(df!("status" => ["unknown", "known unknown", "ok"]).unwrap());
        let params = validated(
            &ReplaceValues,
            json!({"column": "status", "find": "unknown", "replace": "n/a"}),
            &t,
        );
        let out = ReplaceValues.apply(&t, &params).unwrap();
        assert_eq!(
            column_strings(&out, "status"),
            vec!["n/a", "known unknown", "ok"]
        );
    }

    #[test]
    fn test_replace_values_no_match_keeps_dtype() {
        let t = table(df!("v" => [1i64, 2]).unwrap());
        let params = validated(
            &ReplaceValues,
            json!({"column": "v", "find": "9", "replace": "x"}),
            &t,
        );
        let out = ReplaceValues.apply(&t, &params).unwrap();
        assert_eq!(out.data.column("v").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_filter_rows_numeric_equality() {
        let t = table(df!("v" => ["30", "30.0", "40"]).unwrap());
        let params = validated(
            &FilterRows,
            json!({"column": "v", "filter_type": "equals", "value": "30"}),
            &t,
        );
        let out = FilterRows.apply(&t, &params).unwrap();
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn test_filter_rows_greater_than_drops_unparseable() {
        let t = table(df!("v" => [Some("10"), Some("x"), None, Some("25")]).unwrap());
        let params = validated(
            &FilterRows,
            json!({"column": "v", "filter_type": "greater_than", "value": "15"}),
            &t,
        );
        let out = FilterRows.apply(&t, &params).unwrap();
        assert_eq!(column_strings(&out, "v"), vec!["25"]);
    }

    #[test]
    fn test_filter_rows_contains_ignores_missing() {
        let t = table(df!("v" => [Some("alpha"), None, Some("beta")]).unwrap());
        let params = validated(
            &FilterRows,
            json!({"column": "v", "filter_type": "contains", "value": "a"}),
            &t,
        );
        let out = FilterRows.apply(&t, &params).unwrap();
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn test_rename_skips_missing_columns() {
        let t = table(df!("a" => [1i64], "b" => [2i64]).unwrap());
        let params = validated(
            &RenameColumns,
            json!({"mapping": {"a": "alpha", "zzz": "gone"}}),
            &t,
        );
        let out = RenameColumns.apply(&t, &params).unwrap();
        assert_eq!(out.column_names(), vec!["alpha", "b"]);
    }

    #[test]
    fn test_drop_skips_missing_columns() {
        let t = table(df!("a" => [1i64], "b" => [2i64], "c" => [3i64]).unwrap());
        let params = validated(
            &DropColumns,
            json!({"columns": "b, zzz"}),
            &t,
        );
        let out = DropColumns.apply(&t, &params).unwrap();
        assert_eq!(out.column_names(), vec!["a", "c"]);
    }
}
