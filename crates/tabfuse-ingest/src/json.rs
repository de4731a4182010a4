//! JSON ingestion for record lists and flat objects.
//!
//! Three layouts are accepted: a top-level list of records, an object
//! holding a list-valued field (the first such field is normalized),
//! and a flat object which becomes a single-row table. Nested objects
//! are flattened into dotted column names. Nested lists are rejected.

use std::collections::HashMap;

use polars::prelude::DataFrame;
use serde_json::{Map, Value};

use crate::error::{IngestError, Result};
use crate::frame::{Scalar, build_frame};

pub fn read_json(name: &str, bytes: &[u8]) -> Result<DataFrame> {
    let value: Value = serde_json::from_slice(bytes).map_err(|e| IngestError::Parse {
        name: name.to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Array(items) => records_to_frame(name, &items),
        Value::Object(map) => object_to_frame(name, map),
        _ => Err(IngestError::JsonShape {
            name: name.to_string(),
            reason: "top-level value must be an object or a list of records".to_string(),
        }),
    }
}

fn object_to_frame(name: &str, map: Map<String, Value>) -> Result<DataFrame> {
    for (field, value) in &map {
        if let Value::Array(items) = value {
            tracing::debug!(name, field = %field, "normalizing list-valued field");
            return records_to_frame(name, items);
        }
    }
    // No list field: the object itself is a single record.
    let record = Value::Object(map);
    records_to_frame(name, std::slice::from_ref(&record))
}

fn records_to_frame(name: &str, items: &[Value]) -> Result<DataFrame> {
    let mut headers: Vec<String> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut rows: Vec<Vec<Scalar>> = Vec::with_capacity(items.len());

    for item in items {
        let Value::Object(record) = item else {
            return Err(IngestError::JsonShape {
                name: name.to_string(),
                reason: "every entry in a record list must be an object".to_string(),
            });
        };

        let mut flat = Vec::new();
        flatten_into(name, "", record, &mut flat)?;

        let mut row = vec![Scalar::Null; headers.len()];
        for (key, cell) in flat {
            let slot = match slots.get(&key) {
                Some(&idx) => idx,
                None => {
                    let idx = headers.len();
                    slots.insert(key.clone(), idx);
                    headers.push(key);
                    row.push(Scalar::Null);
                    idx
                }
            };
            row[slot] = cell;
        }
        rows.push(row);
    }

    build_frame(&headers, &rows)
}

fn flatten_into(
    name: &str,
    prefix: &str,
    record: &Map<String, Value>,
    out: &mut Vec<(String, Scalar)>,
) -> Result<()> {
    for (key, value) in record {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_into(name, &path, inner, out)?,
            Value::Array(_) => {
                return Err(IngestError::JsonShape {
                    name: name.to_string(),
                    reason: format!("field '{path}' holds a nested list"),
                });
            }
            other => out.push((path, scalar_of(other))),
        }
    }
    Ok(())
}

fn scalar_of(value: &Value) -> Scalar {
    match value {
        Value::Null => Scalar::Null,
        Value::Bool(b) => Scalar::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(v) => Scalar::Int(v),
            None => n.as_f64().map_or(Scalar::Null, Scalar::Float),
        },
        Value::String(s) => Scalar::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => Scalar::Null,
    }
}
