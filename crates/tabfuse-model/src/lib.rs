//! Core data model for the merge engine: tables, merge options, column
//! mappings, and the diagnostics accumulated while a pipeline runs.

pub mod diagnostic;
pub mod mapping;
pub mod options;
pub mod table;
pub mod transform_spec;
pub mod value;

pub use diagnostic::{Diagnostic, DiagnosticList, Severity};
pub use mapping::{ColumnMapping, ColumnMatch};
pub use options::{FillStrategy, IngestLimits, JoinKind, MergeOptions, MergeStrategy};
pub use table::Table;
pub use transform_spec::TransformSpec;
pub use value::{
    any_to_datetime, any_to_f64, any_to_string, column_value_string, format_numeric,
    is_numeric_dtype, parse_bool, parse_f64, timestamp_to_datetime,
};
