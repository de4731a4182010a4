//! Export rendering: tables out to CSV, styled spreadsheets, and JSON.
//!
//! The entry point is [`export`], which renders one table into a named
//! byte buffer per requested format. Delivery (disk, download, upload)
//! is the caller's concern.

mod csv;
mod json;
mod spreadsheet;

pub mod error;

pub use error::{ExportError, Result};

use std::fmt;

use tabfuse_model::Table;

/// Supported export formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Json,
}

impl ExportFormat {
    /// Map a format name (as typed on the command line) to a format.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            "json" => Ok(Self::Json),
            _ => Err(ExportError::UnknownFormat {
                name: name.to_string(),
            }),
        }
    }

    /// File extension written for this format, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// One rendered export: the file name it should be saved under and its
/// byte content.
#[derive(Debug, Clone)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Render `table` once per requested format.
///
/// File names are `{base_name}.{extension}`. Formats render in the
/// order given; the first failure aborts the whole export.
pub fn export(table: &Table, base_name: &str, formats: &[ExportFormat]) -> Result<Vec<ExportFile>> {
    let mut files = Vec::with_capacity(formats.len());
    for format in formats {
        let bytes = match format {
            ExportFormat::Csv => csv::write_csv(table)?,
            ExportFormat::Xlsx => spreadsheet::write_xlsx(table)?,
            ExportFormat::Json => json::write_json(table)?,
        };
        tracing::debug!(
            format = %format,
            bytes = bytes.len(),
            rows = table.row_count(),
            "rendered export"
        );
        files.push(ExportFile {
            file_name: format!("{base_name}.{}", format.extension()),
            bytes,
        });
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    #[test]
    fn test_format_names_parse_case_insensitively() {
        assert_eq!(ExportFormat::from_name("CSV").unwrap(), ExportFormat::Csv);
        assert_eq!(ExportFormat::from_name("excel").unwrap(), ExportFormat::Xlsx);
        let err = ExportFormat::from_name("parquet").unwrap_err();
        assert!(err.to_string().contains("parquet"));
    }

    #[test]
    fn test_export_names_files_after_base() {
        let table = Table::new("t.csv", df!("a" => [1i64]).unwrap());
        let files = export(
            &table,
            "merged",
            &[ExportFormat::Csv, ExportFormat::Json, ExportFormat::Xlsx],
        )
        .unwrap();

        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();
        assert_eq!(names, vec!["merged.csv", "merged.json", "merged.xlsx"]);
        assert!(files.iter().all(|f| !f.bytes.is_empty()));
    }
}
