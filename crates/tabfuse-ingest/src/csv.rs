//! CSV parsing on decoded text buffers.

use std::io::Cursor;

use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::sniff;

/// Number of leading rows used to infer column types.
const INFER_SCHEMA_ROWS: usize = 100;

/// Parse decoded CSV text into a DataFrame.
///
/// The delimiter is sniffed from the text unless one is supplied.
pub fn read_csv(name: &str, text: &str, delimiter: Option<u8>) -> Result<DataFrame> {
    let delimiter = delimiter.unwrap_or_else(|| sniff::detect_delimiter(text));
    tracing::debug!(name, delimiter = %(delimiter as char), "parsing CSV");

    let parse_options = CsvParseOptions::default().with_separator(delimiter);
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_parse_options(parse_options)
        .into_reader_with_file_handle(Cursor::new(text.as_bytes()))
        .finish()
        .map_err(|e| IngestError::Parse {
            name: name.to_string(),
            message: e.to_string(),
        })
}
