//! Error types for export rendering.

use thiserror::Error;

/// Errors raised while rendering a table into export bytes.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Requested format name is not recognized.
    #[error("unknown export format: '{name}'. Supported formats: csv, xlsx, json")]
    UnknownFormat { name: String },

    /// CSV rendering failed.
    #[error("CSV rendering failed: {message}")]
    Csv { message: String },

    /// Spreadsheet rendering failed.
    #[error("spreadsheet rendering failed: {message}")]
    Spreadsheet { message: String },

    /// JSON rendering failed.
    #[error("JSON rendering failed: {message}")]
    Json { message: String },
}

impl From<::csv::Error> for ExportError {
    fn from(err: ::csv::Error) -> Self {
        Self::Csv {
            message: err.to_string(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for ExportError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Spreadsheet {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
