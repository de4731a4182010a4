//! Column-wise frame construction from loosely typed cells.
//!
//! Spreadsheet and JSON inputs arrive as per-cell values without a
//! declared column type. Each column is resolved to the narrowest
//! type that fits every non-missing cell, falling back to text with
//! all values stringified.

use chrono::NaiveDateTime;
use polars::prelude::*;

use tabfuse_model::format_numeric;

use crate::error::Result;

/// A single parsed cell prior to column type resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(NaiveDateTime),
}

impl Scalar {
    fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(format_numeric(*v)),
            Self::Text(s) => Some(s.clone()),
            Self::Timestamp(ts) => Some(ts.format("%Y-%m-%dT%H:%M:%S").to_string()),
        }
    }
}

/// What a whole column of scalars can be represented as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Bool,
    Int,
    Float,
    Timestamp,
    Text,
}

fn resolve_kind(cells: &[Scalar]) -> ColumnKind {
    let mut bools = true;
    let mut ints = true;
    let mut floats = true;
    let mut stamps = true;
    let mut seen = false;

    for cell in cells {
        match cell {
            Scalar::Null => continue,
            Scalar::Bool(_) => {
                ints = false;
                floats = false;
                stamps = false;
            }
            Scalar::Int(_) => {
                bools = false;
                stamps = false;
            }
            Scalar::Float(_) => {
                bools = false;
                ints = false;
                stamps = false;
            }
            Scalar::Timestamp(_) => {
                bools = false;
                ints = false;
                floats = false;
            }
            Scalar::Text(_) => {
                bools = false;
                ints = false;
                floats = false;
                stamps = false;
            }
        }
        seen = true;
    }

    if !seen {
        // All-missing columns stay textual.
        return ColumnKind::Text;
    }
    if bools {
        ColumnKind::Bool
    } else if ints {
        ColumnKind::Int
    } else if floats {
        ColumnKind::Float
    } else if stamps {
        ColumnKind::Timestamp
    } else {
        ColumnKind::Text
    }
}

fn column_series(name: &str, cells: &[Scalar]) -> Series {
    match resolve_kind(cells) {
        ColumnKind::Bool => {
            let values: Vec<Option<bool>> = cells
                .iter()
                .map(|c| match c {
                    Scalar::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Int => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| match c {
                    Scalar::Int(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Float => {
            let values: Vec<Option<f64>> = cells
                .iter()
                .map(|c| match c {
                    Scalar::Int(v) => Some(*v as f64),
                    Scalar::Float(v) => Some(*v),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Timestamp => {
            let values: Vec<Option<NaiveDateTime>> = cells
                .iter()
                .map(|c| match c {
                    Scalar::Timestamp(ts) => Some(*ts),
                    _ => None,
                })
                .collect();
            Series::new(name.into(), values)
        }
        ColumnKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(Scalar::as_text).collect();
            Series::new(name.into(), values)
        }
    }
}

/// Build a DataFrame from header names and row-major cells.
///
/// Rows shorter than the header list are padded with missing cells.
pub fn build_frame(headers: &[String], rows: &[Vec<Scalar>]) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        let cells: Vec<Scalar> = rows
            .iter()
            .map(|row| row.get(idx).cloned().unwrap_or(Scalar::Null))
            .collect();
        columns.push(column_series(header, &cells).into());
    }
    Ok(DataFrame::new(columns)?)
}
