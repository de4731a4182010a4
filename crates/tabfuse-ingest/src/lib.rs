//! File ingestion: format detection, decoding, and table construction.
//!
//! Raw byte buffers go in, [`tabfuse_model::Table`] values come out.
//! CSV input is decoded with a detected character encoding and a
//! sniffed delimiter, spreadsheets are read from their first sheet,
//! and JSON is accepted as record lists or flat objects. Batch loading
//! skips invalid files and reports them as diagnostics instead of
//! failing the whole set.

pub mod csv;
pub mod encoding;
pub mod error;
pub mod format;
pub mod frame;
pub mod json;
pub mod loader;
pub mod reader;
pub mod sniff;
pub mod spreadsheet;

pub use error::{IngestError, Result};
pub use format::{FileFormat, FileInfo, RawFile};
pub use loader::{LoadOutcome, load_files, load_files_with_progress, load_paths};
pub use reader::{ReadOptions, read_table};
