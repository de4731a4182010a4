//! JSON rendering: one object per row.

use polars::prelude::AnyValue;
use serde_json::{Map, Number, Value};

use tabfuse_model::Table;
use tabfuse_model::value::any_to_string;

use crate::error::Result;

/// Render a table as a pretty-printed JSON array of row objects.
/// Timestamps render as ISO 8601 strings.
pub fn write_json(table: &Table) -> Result<Vec<u8>> {
    let names = table.column_names();
    let columns = table.data.get_columns();

    let mut rows = Vec::with_capacity(table.row_count());
    for idx in 0..table.row_count() {
        let mut row = Map::new();
        for (name, column) in names.iter().zip(columns) {
            let value = column.get(idx).unwrap_or(AnyValue::Null);
            row.insert(name.clone(), cell_to_json(value));
        }
        rows.push(Value::Object(row));
    }

    Ok(serde_json::to_vec_pretty(&Value::Array(rows))?)
}

/// Missing cells and non-finite floats map to null, everything
/// non-scalar falls back to its display string.
fn cell_to_json(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::Int8(v) => Value::from(v),
        AnyValue::Int16(v) => Value::from(v),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt8(v) => Value::from(v),
        AnyValue::UInt16(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => float_json(f64::from(v)),
        AnyValue::Float64(v) => float_json(v),
        other => Value::String(any_to_string(other)),
    }
}

fn float_json(v: f64) -> Value {
    Number::from_f64(v).map_or(Value::Null, Value::Number)
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    #[test]
    fn test_cell_types_map_to_json_types() {
        let table = Table::new(
            "t.csv",
            df!(
                "n" => [Some(1i64), None],
                "f" => [1.5f64, 2.0],
                "s" => ["a", "b"],
                "b" => [true, false],
            )
            .unwrap(),
        );
        let parsed: Value = serde_json::from_slice(&write_json(&table).unwrap()).unwrap();

        assert_eq!(parsed[0]["n"], Value::from(1));
        assert_eq!(parsed[1]["n"], Value::Null);
        assert_eq!(parsed[0]["f"], Value::from(1.5));
        assert_eq!(parsed[0]["s"], Value::from("a"));
        assert_eq!(parsed[1]["b"], Value::from(false));
    }

    #[test]
    fn test_nan_becomes_null() {
        assert_eq!(float_json(f64::NAN), Value::Null);
        assert_eq!(float_json(f64::INFINITY), Value::Null);
    }
}
