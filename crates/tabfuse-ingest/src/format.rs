//! Input file classification and raw buffer handling.

use std::ffi::OsStr;
use std::fmt;
use std::path::Path;

use tabfuse_model::IngestLimits;

use crate::error::{IngestError, Result};

/// Supported input formats, keyed by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
    Json,
}

impl FileFormat {
    /// Map a lowercased-or-not extension (without the dot) to a format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "xlsx" | "xls" => Some(Self::Excel),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extension of a file name, lowercased, without the leading dot.
pub fn extension_of(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(OsStr::to_str)
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// Raw bytes of one input file plus its declared size.
///
/// The declared size is validated against [`IngestLimits`] before any
/// parsing happens, so callers can pass a size reported by an upload or
/// by file metadata rather than `bytes.len()`.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub name: String,
    pub declared_size: u64,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let declared_size = bytes.len() as u64;
        Self {
            name: name.into(),
            declared_size,
            bytes,
        }
    }

    /// Read a file from disk, rejecting oversized files before reading them.
    pub fn from_path(path: &Path, limits: &IngestLimits) -> Result<Self> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                IngestError::FileNotFound {
                    path: path.to_path_buf(),
                }
            } else {
                IngestError::FileRead {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let name = path
            .file_name()
            .and_then(OsStr::to_str)
            .map_or_else(|| path.display().to_string(), ToString::to_string);

        if metadata.len() > limits.max_file_bytes {
            return Err(IngestError::FileTooLarge {
                name,
                size: metadata.len(),
                max_megabytes: limits.max_megabytes(),
            });
        }

        let bytes = std::fs::read(path).map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(Self {
            name,
            declared_size: metadata.len(),
            bytes,
        })
    }

    pub fn info(&self) -> FileInfo {
        FileInfo {
            name: self.name.clone(),
            extension: extension_of(&self.name),
            size: self.declared_size,
        }
    }
}

/// Summary metadata for one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub extension: String,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(FileFormat::from_extension("csv"), Some(FileFormat::Csv));
        assert_eq!(FileFormat::from_extension("XLSX"), Some(FileFormat::Excel));
        assert_eq!(FileFormat::from_extension("xls"), Some(FileFormat::Excel));
        assert_eq!(FileFormat::from_extension("json"), Some(FileFormat::Json));
        assert_eq!(FileFormat::from_extension("parquet"), None);
        assert_eq!(FileFormat::from_extension(""), None);
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of("data.CSV"), "csv");
        assert_eq!(extension_of("report.final.xlsx"), "xlsx");
        assert_eq!(extension_of("noext"), "");
    }

    #[test]
    fn test_raw_file_declared_size_defaults_to_buffer_length() {
        let file = RawFile::new("a.csv", b"a,b\n1,2\n".to_vec());
        assert_eq!(file.declared_size, 8);
        assert_eq!(file.info().extension, "csv");
    }
}
