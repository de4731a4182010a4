//! Calculated columns from sandboxed numeric expressions.

use std::collections::BTreeMap;

use polars::prelude::*;
use serde_json::json;

use tabfuse_model::Table;

use crate::data_utils::{coerce_numeric, require_column, target_name, with_series};
use crate::error::Result;
use crate::expr::{self, ExpressionError};
use crate::param::{ParamKind, ParamSpec, Params};
use crate::registry::Transform;

/// Evaluate an arithmetic expression over existing columns and store the
/// per-row result in a new column.
pub struct CalculatedColumn;

impl Transform for CalculatedColumn {
    fn name(&self) -> &'static str {
        "calculated_column"
    }

    fn description(&self) -> &'static str {
        "Create a new column from an expression over existing columns"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("column_name", "Column Name", ParamKind::Text)
                .with_default(json!("calculated_column")),
            ParamSpec::required("expression", "Expression", ParamKind::Text).with_help(
                "Column names as variables, e.g. 'price * quantity' or 'sqrt(area)'",
            ),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let target = target_name(params.str("column_name"))?;
        let expression = params.required_str("expression", "Expression")?;

        let parsed = expr::parse(expression)?;

        let mut columns: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
        for name in parsed.column_refs() {
            if !table.has_column(&name) {
                return Err(ExpressionError::UnknownIdentifier { name }.into());
            }
            let values = coerce_numeric(require_column(&table.data, &name)?)
                .into_iter()
                .map(|cell| cell.filter(|v| v.is_finite()))
                .collect();
            columns.insert(name, values);
        }

        let values: Vec<Option<f64>> = (0..table.row_count())
            .map(|row| parsed.evaluate(&columns, row))
            .collect();

        with_series(table, Series::new(target.as_str().into(), values))
    }
}

#[cfg(test)]
mod tests {
    use crate::data_utils::coerce_numeric;

    use super::*;

    fn table(df: DataFrame) -> Table {
        Table::new("t.csv", df)
    }

    fn validated(transform: &dyn Transform, raw: serde_json::Value, table: &Table) -> Params {
        Params::validate(&transform.parameters(), raw.as_object().unwrap(), table).unwrap()
    }

    fn column_f64(table: &Table, name: &str) -> Vec<Option<f64>> {
        let series = table.data.column(name).unwrap().as_materialized_series();
        coerce_numeric(series)
    }

    #[test]
    fn test_expression_over_columns() {
        let t = table(
            df!(
                "price" => [2.0f64, 3.0],
                "quantity" => [4.0f64, 5.0],
            )
            .unwrap(),
        );
        let params = validated(
            &CalculatedColumn,
            json!({"column_name": "total", "expression": "price * quantity"}),
            &t,
        );
        let out = CalculatedColumn.apply(&t, &params).unwrap();
        assert_eq!(column_f64(&out, "total"), vec![Some(8.0), Some(15.0)]);
    }

    #[test]
    fn test_missing_operand_propagates() {
        let t = table(df!("a" => [Some(1.0f64), None]).unwrap());
        let params = validated(
            &CalculatedColumn,
            json!({"expression": "a + 1"}),
            &t,
        );
        let out = CalculatedColumn.apply(&t, &params).unwrap();
        assert_eq!(
            column_f64(&out, "calculated_column"),
            vec![Some(2.0), None]
        );
    }

    #[test]
    fn test_unknown_column_reference() {
        let t = table(df!("a" => [1.0f64]).unwrap());
        let params = validated(
            &CalculatedColumn,
            json!({"expression": "a + missing"}),
            &t,
        );
        let err = CalculatedColumn.apply(&t, &params).unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown identifier 'missing' in expression"
        );
    }

    #[test]
    fn test_zero_divisor_yields_missing() {
        let t = table(
            df!(
                "a" => [10.0f64, 10.0],
                "b" => [2.0f64, 0.0],
            )
            .unwrap(),
        );
        let params = validated(
            &CalculatedColumn,
            json!({"column_name": "q", "expression": "a / b"}),
            &t,
        );
        let out = CalculatedColumn.apply(&t, &params).unwrap();
        assert_eq!(column_f64(&out, "q"), vec![Some(5.0), None]);
    }

    #[test]
    fn test_function_whitelist_and_comparison() {
        let t = table(df!("x" => [9.0f64, 16.0]).unwrap());
        let params = validated(
            &CalculatedColumn,
            json!({"column_name": "flag", "expression": "sqrt(x) >= 4"}),
            &t,
        );
        let out = CalculatedColumn.apply(&t, &params).unwrap();
        assert_eq!(column_f64(&out, "flag"), vec![Some(0.0), Some(1.0)]);
    }
}
