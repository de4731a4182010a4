//! Batch loading with per-file diagnostics.
//!
//! Invalid inputs never abort a batch. Each failing file is skipped
//! and reported through an error diagnostic naming the file, so the
//! caller can continue with whatever loaded cleanly.

use std::ffi::OsStr;
use std::path::PathBuf;

use tabfuse_model::{Diagnostic, DiagnosticList, IngestLimits, Table};

use crate::format::RawFile;
use crate::reader::{ReadOptions, read_table};

/// Result of loading a batch of files.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub tables: Vec<Table>,
    pub diagnostics: DiagnosticList,
}

/// Load a batch of in-memory files.
pub fn load_files(files: &[RawFile], limits: &IngestLimits) -> LoadOutcome {
    load_files_with_progress(files, limits, |_, _| {})
}

/// Load a batch of in-memory files, reporting `(done, total)` after each.
pub fn load_files_with_progress(
    files: &[RawFile],
    limits: &IngestLimits,
    mut progress: impl FnMut(usize, usize),
) -> LoadOutcome {
    let options = ReadOptions::default();
    let mut outcome = LoadOutcome::default();
    let total = files.len();

    for (index, file) in files.iter().enumerate() {
        match read_table(file, limits, &options) {
            Ok(table) => {
                tracing::info!(
                    name = %file.name,
                    rows = table.row_count(),
                    columns = table.column_count(),
                    "loaded table"
                );
                outcome.tables.push(table);
            }
            Err(error) => {
                tracing::warn!(name = %file.name, %error, "skipping file");
                outcome
                    .diagnostics
                    .push(Diagnostic::error(error.to_string()).with_source(file.name.clone()));
            }
        }
        progress(index + 1, total);
    }

    outcome
}

/// Load a batch of files from disk.
///
/// Unreadable and oversized paths become error diagnostics like any
/// other rejected input. Oversized files are rejected from metadata
/// alone, without reading their contents.
pub fn load_paths(
    paths: &[PathBuf],
    limits: &IngestLimits,
    mut progress: impl FnMut(usize, usize),
) -> LoadOutcome {
    let options = ReadOptions::default();
    let mut outcome = LoadOutcome::default();
    let total = paths.len();

    for (index, path) in paths.iter().enumerate() {
        let label = path
            .file_name()
            .and_then(OsStr::to_str)
            .map_or_else(|| path.display().to_string(), ToString::to_string);

        let result =
            RawFile::from_path(path, limits).and_then(|file| read_table(&file, limits, &options));
        match result {
            Ok(table) => {
                tracing::info!(
                    name = %label,
                    rows = table.row_count(),
                    columns = table.column_count(),
                    "loaded table"
                );
                outcome.tables.push(table);
            }
            Err(error) => {
                tracing::warn!(name = %label, %error, "skipping file");
                outcome
                    .diagnostics
                    .push(Diagnostic::error(error.to_string()).with_source(label));
            }
        }
        progress(index + 1, total);
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_files_become_diagnostics_and_good_ones_load() {
        let files = vec![
            RawFile::new("good.csv", b"id,name\n1,a\n2,b\n".to_vec()),
            RawFile::new("bad.parquet", b"whatever".to_vec()),
            RawFile::new("also_good.json", br#"[{"id": 3}]"#.to_vec()),
        ];
        let outcome = load_files(&files, &IngestLimits::default());

        assert_eq!(outcome.tables.len(), 2);
        assert_eq!(outcome.tables[0].label, "good.csv");
        assert_eq!(outcome.tables[1].label, "also_good.json");
        assert_eq!(outcome.diagnostics.error_count(), 1);
    }

    #[test]
    fn test_progress_reports_every_file() {
        let files = vec![
            RawFile::new("a.csv", b"x\n1\n".to_vec()),
            RawFile::new("b.csv", b"x\n2\n".to_vec()),
        ];
        let mut seen = Vec::new();
        load_files_with_progress(&files, &IngestLimits::default(), |done, total| {
            seen.push((done, total));
        });
        assert_eq!(seen, vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_oversized_file_is_skipped() {
        let mut file = RawFile::new("big.csv", b"id\n1\n".to_vec());
        file.declared_size = u64::MAX;
        let outcome = load_files(&[file], &IngestLimits::default());

        assert!(outcome.tables.is_empty());
        assert!(outcome.diagnostics.has_errors());
        let message = outcome.diagnostics.iter().next().unwrap().to_string();
        assert!(message.contains("maximum allowed size"));
    }
}
