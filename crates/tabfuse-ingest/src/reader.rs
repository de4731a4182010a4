//! Single-buffer ingestion entry point.

use polars::prelude::DataFrame;

use tabfuse_model::{IngestLimits, Table};

use crate::error::{IngestError, Result};
use crate::format::{FileFormat, RawFile, extension_of};
use crate::{csv, encoding, json, spreadsheet};

/// Optional per-file reader overrides.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// Explicit CSV column delimiter, bypassing sniffing.
    pub delimiter: Option<u8>,
    /// Explicit character encoding label, bypassing detection.
    pub encoding: Option<String>,
}

/// Turn one raw file into a table.
///
/// The declared size is checked against the limits before anything is
/// parsed, then the file is dispatched on its extension. Tables that
/// come back with no rows or no columns are rejected.
pub fn read_table(file: &RawFile, limits: &IngestLimits, options: &ReadOptions) -> Result<Table> {
    if file.declared_size > limits.max_file_bytes {
        return Err(IngestError::FileTooLarge {
            name: file.name.clone(),
            size: file.declared_size,
            max_megabytes: limits.max_megabytes(),
        });
    }

    let extension = extension_of(&file.name);
    let Some(format) = FileFormat::from_extension(&extension) else {
        return Err(IngestError::UnsupportedFormat { extension });
    };

    let df = match format {
        FileFormat::Csv => {
            let (text, used) = encoding::decode_text(&file.bytes, options.encoding.as_deref());
            tracing::debug!(name = %file.name, encoding = used, "decoded CSV buffer");
            if text.trim().is_empty() {
                return Err(IngestError::EmptyTable {
                    name: file.name.clone(),
                });
            }
            csv::read_csv(&file.name, &text, options.delimiter)?
        }
        FileFormat::Excel => spreadsheet::read_spreadsheet(&file.name, &file.bytes)?,
        FileFormat::Json => json::read_json(&file.name, &file.bytes)?,
    };

    validate_shape(&file.name, &df)?;
    Ok(Table::new(file.name.clone(), df))
}

fn validate_shape(name: &str, df: &DataFrame) -> Result<()> {
    if df.height() == 0 || df.width() == 0 {
        return Err(IngestError::EmptyTable {
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> IngestLimits {
        IngestLimits::default()
    }

    #[test]
    fn test_csv_buffer_round_trip() {
        let file = RawFile::new("people.csv", b"id,name\n1,ada\n2,grace\n".to_vec());
        let table = read_table(&file, &limits(), &ReadOptions::default()).unwrap();
        assert_eq!(table.label, "people.csv");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["id", "name"]);
    }

    #[test]
    fn test_size_ceiling_checked_before_parse() {
        // Garbage contents never reach the parser when the size fails.
        let mut file = RawFile::new("big.csv", b"not,valid\x00csv".to_vec());
        file.declared_size = 200 * 1024 * 1024;
        let err = read_table(&file, &limits(), &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::FileTooLarge { .. }));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let file = RawFile::new("data.parquet", b"whatever".to_vec());
        let err = read_table(&file, &limits(), &ReadOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::UnsupportedFormat { extension } if extension == "parquet"
        ));
    }

    #[test]
    fn test_blank_csv_is_empty() {
        let file = RawFile::new("blank.csv", b"  \n \n".to_vec());
        let err = read_table(&file, &limits(), &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyTable { .. }));
    }

    #[test]
    fn test_header_only_csv_is_empty() {
        let file = RawFile::new("header.csv", b"id,name\n".to_vec());
        let err = read_table(&file, &limits(), &ReadOptions::default()).unwrap_err();
        assert!(matches!(err, IngestError::EmptyTable { .. }));
    }

    #[test]
    fn test_json_buffer_round_trip() {
        let file = RawFile::new("rows.json", br#"[{"id": 1}, {"id": 2}]"#.to_vec());
        let table = read_table(&file, &limits(), &ReadOptions::default()).unwrap();
        assert_eq!(table.row_count(), 2);
    }
}
