//! CLI argument definitions for tabfuse.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use tabfuse_cli::logging::LogFormat;
use tabfuse_export::ExportFormat;
use tabfuse_model::{FillStrategy, JoinKind, MergeStrategy};

#[derive(Parser)]
#[command(
    name = "tabfuse",
    version,
    about = "Merge, transform, and export tabular data files",
    long_about = "Combine CSV, spreadsheet, and JSON files into one table,\n\
                  run column transformations over it, and export the result\n\
                  as CSV, xlsx, or JSON."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge data files into one table and export it.
    Merge(MergeArgs),

    /// Apply a transformation pipeline to one file.
    Transform(TransformArgs),

    /// List the available transformations and their parameters.
    Transforms,

    /// Summarize one file: shape, columns, dtypes, duplicates.
    Inspect(InspectArgs),
}

#[derive(Parser)]
pub struct MergeArgs {
    /// Input files to merge (csv, xlsx, xls, json).
    #[arg(value_name = "FILES", required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// How the input tables are combined.
    #[arg(long, value_enum, default_value = "append")]
    pub strategy: StrategyArg,

    /// Join key column (required for the join strategy).
    #[arg(long = "key", value_name = "COLUMN")]
    pub key: Option<String>,

    /// How unmatched rows are treated during a join.
    #[arg(long = "join-kind", value_enum, default_value = "outer")]
    pub join_kind: JoinKindArg,

    /// Rename similarly named columns to match before joining.
    #[arg(long)]
    pub fuzzy: bool,

    /// Similarity floor for fuzzy column matches, in 0.0-1.0.
    #[arg(long, value_name = "T", default_value_t = 0.8)]
    pub threshold: f64,

    /// Match column names exactly instead of lowercasing them first.
    #[arg(long = "case-sensitive")]
    pub case_sensitive: bool,

    /// Drop duplicate rows from each table before merging.
    #[arg(long = "drop-duplicates")]
    pub drop_duplicates: bool,

    /// Missing-value fill method applied to each table before merging.
    #[arg(long = "fill", value_enum, default_value = "none")]
    pub fill: FillArg,

    /// Literal used with --fill custom.
    #[arg(long = "fill-value", value_name = "VALUE")]
    pub fill_value: Option<String>,

    /// Base name for the merged output files.
    #[arg(long, value_name = "NAME", default_value = "merged_data")]
    pub output: String,

    /// Export formats to write, comma separated.
    #[arg(
        long = "format",
        value_enum,
        value_delimiter = ',',
        default_value = "csv"
    )]
    pub format: Vec<FormatArg>,

    /// Directory the export files are written to.
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Per-file size ceiling in megabytes.
    #[arg(long = "max-size-mb", value_name = "N", default_value_t = 100)]
    pub max_size_mb: u64,
}

#[derive(Parser)]
pub struct TransformArgs {
    /// Input file to transform.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// JSON file holding the ordered list of transformation specs.
    #[arg(long = "pipeline", value_name = "SPECS")]
    pub pipeline: PathBuf,

    /// Output file (format from the extension); stdout CSV when omitted.
    #[arg(long = "out", value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Per-file size ceiling in megabytes.
    #[arg(long = "max-size-mb", value_name = "N", default_value_t = 100)]
    pub max_size_mb: u64,
}

#[derive(Parser)]
pub struct InspectArgs {
    /// File to summarize.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Per-file size ceiling in megabytes.
    #[arg(long = "max-size-mb", value_name = "N", default_value_t = 100)]
    pub max_size_mb: u64,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    Append,
    Join,
    Smart,
}

impl From<StrategyArg> for MergeStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Append => Self::Append,
            StrategyArg::Join => Self::Join,
            StrategyArg::Smart => Self::Smart,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum JoinKindArg {
    Outer,
    Inner,
    Left,
}

impl From<JoinKindArg> for JoinKind {
    fn from(arg: JoinKindArg) -> Self {
        match arg {
            JoinKindArg::Outer => Self::Outer,
            JoinKindArg::Inner => Self::Inner,
            JoinKindArg::Left => Self::Left,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FillArg {
    None,
    Zero,
    Mean,
    Median,
    Mode,
    ForwardFill,
    BackwardFill,
    Custom,
}

impl From<FillArg> for FillStrategy {
    fn from(arg: FillArg) -> Self {
        match arg {
            FillArg::None => Self::None,
            FillArg::Zero => Self::Zero,
            FillArg::Mean => Self::Mean,
            FillArg::Median => Self::Median,
            FillArg::Mode => Self::Mode,
            FillArg::ForwardFill => Self::ForwardFill,
            FillArg::BackwardFill => Self::BackwardFill,
            FillArg::Custom => Self::Custom,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Xlsx,
    Json,
}

impl From<FormatArg> for ExportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => Self::Csv,
            FormatArg::Xlsx => Self::Xlsx,
            FormatArg::Json => Self::Json,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
        }
    }
}
