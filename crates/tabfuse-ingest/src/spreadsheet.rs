//! Spreadsheet ingestion through calamine.
//!
//! Only the first worksheet is read. The first row supplies column
//! names and the remaining rows become data, with column types
//! resolved from cell content.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use polars::prelude::DataFrame;

use crate::error::{IngestError, Result};
use crate::frame::{Scalar, build_frame};

pub fn read_spreadsheet(name: &str, bytes: &[u8]) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| {
        IngestError::Parse {
            name: name.to_string(),
            message: e.to_string(),
        }
    })?;

    let Some(sheet) = workbook.sheet_names().first().cloned() else {
        return Err(IngestError::EmptyTable {
            name: name.to_string(),
        });
    };
    tracing::debug!(name, sheet = %sheet, "reading first worksheet");

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| IngestError::Parse {
            name: name.to_string(),
            message: e.to_string(),
        })?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(IngestError::EmptyTable {
            name: name.to_string(),
        });
    };

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(cell, idx))
        .collect();
    let body: Vec<Vec<Scalar>> = rows
        .map(|row| row.iter().map(cell_scalar).collect())
        .collect();

    build_frame(&headers, &body)
}

fn header_name(cell: &Data, idx: usize) -> String {
    let text = match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    if text.is_empty() {
        format!("column_{}", idx + 1)
    } else {
        text
    }
}

fn cell_scalar(cell: &Data) -> Scalar {
    match cell {
        Data::Empty | Data::Error(_) => Scalar::Null,
        Data::String(s) => {
            if s.is_empty() {
                Scalar::Null
            } else {
                Scalar::Text(s.clone())
            }
        }
        Data::Int(v) => Scalar::Int(*v),
        // Excel stores every number as a float. Whole values come back
        // as integers so id-like columns keep an integer type.
        Data::Float(v) => {
            if v.fract() == 0.0 && v.is_finite() && v.abs() < 9_007_199_254_740_992.0 {
                Scalar::Int(*v as i64)
            } else {
                Scalar::Float(*v)
            }
        }
        Data::Bool(b) => Scalar::Bool(*b),
        Data::DateTime(dt) => dt.as_datetime().map_or(Scalar::Null, Scalar::Timestamp),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Scalar::Text(s.clone()),
    }
}
