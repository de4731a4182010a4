//! Command implementations.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use comfy_table::{Attribute, Cell, CellAlignment, Color};
use indicatif::{ProgressBar, ProgressStyle};

use tabfuse_export::{ExportFormat, export};
use tabfuse_ingest::loader::load_paths;
use tabfuse_merge::{drop_duplicate_rows, merge};
use tabfuse_model::{
    DiagnosticList, IngestLimits, MergeOptions, Table, TransformSpec, column_value_string,
};
use tabfuse_transform::{ParamSpec, apply_all, registry};

use crate::cli::{InspectArgs, MergeArgs, TransformArgs};
use crate::summary::{align_column, apply_table_style, dim_cell, header_cell};

const PREVIEW_ROWS: usize = 5;

/// What `merge` produced, for the closing summary.
#[derive(Debug)]
pub struct MergeReport {
    pub loaded: usize,
    pub rows: usize,
    pub columns: usize,
    pub written: Vec<PathBuf>,
    pub diagnostics: DiagnosticList,
}

/// What `transform` produced, for the closing summary.
#[derive(Debug)]
pub struct TransformReport {
    pub steps: usize,
    pub rows: usize,
    pub columns: usize,
    pub written: Option<PathBuf>,
    pub diagnostics: DiagnosticList,
}

pub fn run_merge(args: &MergeArgs) -> Result<MergeReport> {
    let limits = IngestLimits::from_megabytes(args.max_size_mb);
    let bar = progress_bar(args.files.len() as u64, "loading files");
    let outcome = load_paths(&args.files, &limits, |done, _| {
        bar.set_position(done as u64);
    });
    bar.finish_and_clear();

    let mut diagnostics = outcome.diagnostics;
    if outcome.tables.is_empty() {
        let reasons: Vec<String> = diagnostics.iter().map(ToString::to_string).collect();
        bail!("no input file could be loaded\n{}", reasons.join("\n"));
    }
    let loaded = outcome.tables.len();

    let options = merge_options(args);
    let merged = merge(outcome.tables, &options)?;
    diagnostics.append(merged.diagnostics);

    let formats: Vec<ExportFormat> = args.format.iter().copied().map(Into::into).collect();
    let files = export(&merged.table, &args.output, &formats)?;

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let path = args.out_dir.join(&file.file_name);
        fs::write(&path, &file.bytes).with_context(|| format!("writing {}", path.display()))?;
        written.push(path);
    }

    Ok(MergeReport {
        loaded,
        rows: merged.table.row_count(),
        columns: merged.table.column_count(),
        written,
        diagnostics,
    })
}

fn merge_options(args: &MergeArgs) -> MergeOptions {
    let mut options = MergeOptions::new()
        .with_strategy(args.strategy.into())
        .with_join_kind(args.join_kind.into())
        .with_ignore_case(!args.case_sensitive)
        .with_drop_duplicates(args.drop_duplicates)
        .with_fill(args.fill.into(), args.fill_value.clone())
        .with_output_name(args.output.clone());
    if let Some(key) = &args.key {
        options = options.with_join_key(key.clone());
    }
    if args.fuzzy {
        options = options.with_fuzzy_matching(args.threshold);
    }
    options
}

pub fn run_transform(args: &TransformArgs) -> Result<TransformReport> {
    let limits = IngestLimits::from_megabytes(args.max_size_mb);
    let table = load_single(&args.file, &limits)?;

    let text = fs::read_to_string(&args.pipeline)
        .with_context(|| format!("reading {}", args.pipeline.display()))?;
    let specs: Vec<TransformSpec> = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", args.pipeline.display()))?;

    let outcome = apply_all(table, &specs);

    let written = match &args.out {
        Some(path) => {
            write_table(&outcome.table, path)?;
            Some(path.clone())
        }
        None => {
            let rendered = export(&outcome.table, "stdout", &[ExportFormat::Csv])?;
            for file in rendered {
                io::stdout()
                    .write_all(&file.bytes)
                    .context("writing to stdout")?;
            }
            None
        }
    };

    Ok(TransformReport {
        steps: specs.len(),
        rows: outcome.table.row_count(),
        columns: outcome.table.column_count(),
        written,
        diagnostics: outcome.diagnostics,
    })
}

pub fn run_transforms() {
    let mut listing = comfy_table::Table::new();
    apply_table_style(&mut listing);
    listing.set_header(vec![
        header_cell("Name"),
        header_cell("Description"),
        header_cell("Parameters"),
    ]);
    for transform in registry().all() {
        let parameters: Vec<String> = transform.parameters().iter().map(describe_param).collect();
        listing.add_row(vec![
            Cell::new(transform.name())
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(transform.description()),
            if parameters.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(parameters.join("\n"))
            },
        ]);
    }
    println!("{listing}");
}

fn describe_param(spec: &ParamSpec) -> String {
    let mut text = format!("{}: {}", spec.name, spec.kind.name());
    if spec.required {
        text.push_str(" (required)");
    } else if let Some(default) = &spec.default {
        text.push_str(&format!(" (default: {default})"));
    }
    if !spec.options.is_empty() {
        text.push_str(&format!(" [{}]", spec.options.join(", ")));
    }
    text
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let limits = IngestLimits::from_megabytes(args.max_size_mb);
    let table = load_single(&args.file, &limits)?;

    println!("File: {}", table.label);
    println!(
        "Shape: {} rows, {} columns",
        table.row_count(),
        table.column_count()
    );

    let mut listing = comfy_table::Table::new();
    apply_table_style(&mut listing);
    listing.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Missing"),
    ]);
    for column in table.data.get_columns() {
        let missing = column.null_count();
        listing.add_row(vec![
            Cell::new(column.name().as_str()),
            Cell::new(column.dtype().to_string()),
            if missing > 0 {
                Cell::new(missing).fg(Color::Yellow)
            } else {
                dim_cell("0")
            },
        ]);
    }
    align_column(&mut listing, 2, CellAlignment::Right);
    println!("{listing}");

    let names = table.column_names();
    let preview_rows = table.row_count().min(PREVIEW_ROWS);
    if preview_rows > 0 {
        let mut preview = comfy_table::Table::new();
        apply_table_style(&mut preview);
        preview.set_header(names.iter().map(|name| header_cell(name)).collect::<Vec<_>>());
        for row in 0..preview_rows {
            preview.add_row(
                names
                    .iter()
                    .map(|name| column_value_string(&table.data, name, row))
                    .collect::<Vec<_>>(),
            );
        }
        println!("Preview (first {preview_rows} rows):");
        println!("{preview}");
    }

    let (_, duplicates) = drop_duplicate_rows(&table.data, None)?;
    if duplicates.count == 0 {
        println!("Duplicate rows: none");
    } else {
        println!("Duplicate rows: {}", duplicates.count);
    }
    Ok(())
}

/// Load exactly one table, turning per-file diagnostics into a hard error.
fn load_single(path: &Path, limits: &IngestLimits) -> Result<Table> {
    let mut outcome = load_paths(&[path.to_path_buf()], limits, |_, _| {});
    match outcome.tables.pop() {
        Some(table) => Ok(table),
        None => {
            let reason = outcome
                .diagnostics
                .iter()
                .next()
                .map_or_else(|| "unknown error".to_string(), |d| d.message.clone());
            bail!("could not load {}: {reason}", path.display())
        }
    }
}

/// Write one table to `path`, picking the format from the extension.
fn write_table(table: &Table, path: &Path) -> Result<()> {
    let format = match path.extension().and_then(OsStr::to_str) {
        Some(extension) => ExportFormat::from_name(extension)?,
        None => ExportFormat::Csv,
    };
    let base = path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("transformed");
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    for file in export(table, base, &[format])? {
        fs::write(path, &file.bytes).with_context(|| format!("writing {}", path.display()))?;
    }
    Ok(())
}

fn progress_bar(total: u64, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("{msg} [{bar:30.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar.set_message(message);
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::cli::{FillArg, FormatArg, JoinKindArg, StrategyArg};

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_merge_command_writes_requested_formats() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_file(&dir, "a.csv", "id,name\n1,ada\n2,grace\n");
        let second = write_file(&dir, "b.csv", "id,name\n3,alan\n");
        let out_dir = dir.path().join("out");

        let args = MergeArgs {
            files: vec![first, second],
            strategy: StrategyArg::Append,
            key: None,
            join_kind: JoinKindArg::Outer,
            fuzzy: false,
            threshold: 0.8,
            case_sensitive: false,
            drop_duplicates: false,
            fill: FillArg::None,
            fill_value: None,
            output: "merged".to_string(),
            format: vec![FormatArg::Csv, FormatArg::Json],
            out_dir: out_dir.clone(),
            max_size_mb: 100,
        };

        let report = run_merge(&args).unwrap();

        assert_eq!(report.loaded, 2);
        assert_eq!(report.rows, 3);
        assert_eq!(report.columns, 2);
        assert_eq!(report.written.len(), 2);
        assert!(out_dir.join("merged.csv").is_file());
        assert!(out_dir.join("merged.json").is_file());
    }

    #[test]
    fn test_merge_command_fails_when_nothing_loads() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.csv");

        let args = MergeArgs {
            files: vec![missing],
            strategy: StrategyArg::Append,
            key: None,
            join_kind: JoinKindArg::Outer,
            fuzzy: false,
            threshold: 0.8,
            case_sensitive: false,
            drop_duplicates: false,
            fill: FillArg::None,
            fill_value: None,
            output: "merged".to_string(),
            format: vec![FormatArg::Csv],
            out_dir: dir.path().to_path_buf(),
            max_size_mb: 100,
        };

        let error = run_merge(&args).unwrap_err();
        assert!(error.to_string().contains("no input file could be loaded"));
    }

    #[test]
    fn test_transform_command_applies_pipeline_and_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_file(&dir, "people.csv", "name,score\nada,10\ngrace,20\n");
        let pipeline = write_file(
            &dir,
            "pipeline.json",
            r#"[{"name": "text_case", "params": {"column": "name", "case_type": "upper"}}]"#,
        );
        let out = dir.path().join("nested").join("result.csv");

        let args = TransformArgs {
            file: input,
            pipeline,
            out: Some(out.clone()),
            max_size_mb: 100,
        };

        let report = run_transform(&args).unwrap();

        assert_eq!(report.steps, 1);
        assert_eq!(report.rows, 2);
        assert_eq!(report.columns, 2);
        assert_eq!(report.diagnostics.warning_count(), 0);
        let written = fs::read_to_string(&out).unwrap();
        assert_eq!(written, "name,score\nADA,10\nGRACE,20\n");
    }
}
