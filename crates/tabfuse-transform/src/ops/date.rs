//! Date formatting, component extraction, and difference calculation.

use std::fmt::Write as _;

use chrono::{Datelike, NaiveDateTime, Timelike};
use polars::prelude::*;
use serde_json::json;

use tabfuse_model::Table;

use crate::data_utils::{datetime_values, require_column, target_name, with_series};
use crate::error::{Result, TransformError};
use crate::param::{ParamKind, ParamSpec, Params};
use crate::registry::Transform;

const OUTPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%Y%m%d",
    "custom",
];

/// Render one timestamp with a chrono pattern, rejecting invalid patterns.
fn format_cell(dt: NaiveDateTime, pattern: &str) -> Result<String> {
    let mut out = String::new();
    write!(out, "{}", dt.format(pattern))
        .map_err(|_| TransformError::invalid(format!("Invalid output format '{pattern}'")))?;
    Ok(out)
}

/// Reformat timestamps in a column, auto-detecting the input format unless
/// one is given. Unparseable cells become empty text.
pub struct DateFormat;

impl Transform for DateFormat {
    fn name(&self) -> &'static str {
        "date_format"
    }

    fn description(&self) -> &'static str {
        "Convert or format dates in a column"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("column", "Column", ParamKind::Column),
            ParamSpec::optional("input_format", "Input Format", ParamKind::Text)
                .with_help("Leave blank to auto-detect, e.g. '%Y-%m-%d'"),
            ParamSpec::required("output_format", "Output Format", ParamKind::Select)
                .with_options(OUTPUT_FORMATS)
                .with_default(json!("%Y-%m-%d")),
            ParamSpec::optional("custom_output_format", "Custom Output Format", ParamKind::Text)
                .with_help("Only used when the output format is 'custom'"),
            ParamSpec::optional("create_new_column", "Create New Column", ParamKind::Bool)
                .with_default(json!(false)),
            ParamSpec::optional("new_column_name", "New Column Name", ParamKind::Text)
                .with_help("Only used when creating a new column"),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let column = params.required_str("column", "Column")?;
        let input_format = params
            .str("input_format")
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let output_format = params.required_str("output_format", "Output Format")?;
        let create_new = params.bool_or("create_new_column", false);
        let new_name = params
            .str("new_column_name")
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let pattern = if output_format == "custom" {
            match params.str("custom_output_format").map(str::trim) {
                Some(custom) if !custom.is_empty() => custom,
                _ => {
                    return Err(TransformError::invalid(
                        "Custom output format cannot be empty",
                    ));
                }
            }
        } else {
            output_format
        };

        let target = match new_name {
            Some(name) if create_new => name.to_string(),
            _ => column.to_string(),
        };

        let series = require_column(&table.data, column)?;
        let parsed = datetime_values(series, input_format);
        let mut formatted = Vec::with_capacity(parsed.len());
        for cell in parsed {
            formatted.push(match cell {
                Some(dt) => format_cell(dt, pattern)?,
                None => String::new(),
            });
        }

        with_series(table, Series::new(target.as_str().into(), formatted))
    }
}

const COMPONENTS: &[&str] = &[
    "year",
    "month",
    "month_name",
    "day",
    "day_of_week",
    "day_name",
    "quarter",
    "week",
    "hour",
    "minute",
    "second",
];

/// Extract one calendar or clock component into a target column.
pub struct DateComponent;

impl Transform for DateComponent {
    fn name(&self) -> &'static str {
        "date_component"
    }

    fn description(&self) -> &'static str {
        "Extract components (year, month, day, etc.) from dates"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("column", "Date Column", ParamKind::Column),
            ParamSpec::required("component", "Component to Extract", ParamKind::Select)
                .with_options(COMPONENTS)
                .with_default(json!("year")),
            ParamSpec::required("target_column", "Target Column Name", ParamKind::Text),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let column = params.required_str("column", "Date Column")?;
        let component = params.required_str("component", "Component to Extract")?;
        let target = target_name(params.str("target_column"))?;

        let series = require_column(&table.data, column)?;
        let dates = datetime_values(series, None);

        let series = match component {
            "month_name" => text_component(&target, &dates, |dt| format_cell(dt, "%B"))?,
            "day_name" => text_component(&target, &dates, |dt| format_cell(dt, "%A"))?,
            _ => numeric_component(&target, &dates, component)?,
        };
        with_series(table, series)
    }
}

fn text_component(
    target: &str,
    dates: &[Option<NaiveDateTime>],
    extract: impl Fn(NaiveDateTime) -> Result<String>,
) -> Result<Series> {
    let mut values: Vec<Option<String>> = Vec::with_capacity(dates.len());
    for cell in dates {
        values.push(match cell {
            Some(dt) => Some(extract(*dt)?),
            None => None,
        });
    }
    Ok(Series::new(target.into(), values))
}

fn numeric_component(
    target: &str,
    dates: &[Option<NaiveDateTime>],
    component: &str,
) -> Result<Series> {
    let extract = |dt: NaiveDateTime| -> i32 {
        match component {
            "year" => dt.year(),
            "month" => dt.month() as i32,
            "day" => dt.day() as i32,
            // Monday is 1, Sunday is 7.
            "day_of_week" => dt.weekday().num_days_from_monday() as i32 + 1,
            "quarter" => (dt.month0() / 3) as i32 + 1,
            "week" => dt.iso_week().week() as i32,
            "hour" => dt.hour() as i32,
            "minute" => dt.minute() as i32,
            _ => dt.second() as i32,
        }
    };
    let values: Vec<Option<i32>> = dates.iter().map(|cell| cell.map(extract)).collect();
    Ok(Series::new(target.into(), values))
}

const UNITS: &[&str] = &[
    "days", "hours", "minutes", "seconds", "weeks", "months", "years",
];

/// Elapsed time between two date columns in a chosen unit.
pub struct DateDifference;

impl Transform for DateDifference {
    fn name(&self) -> &'static str {
        "date_difference"
    }

    fn description(&self) -> &'static str {
        "Calculate the difference between two date columns"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("start_column", "Start Date Column", ParamKind::Column),
            ParamSpec::required("end_column", "End Date Column", ParamKind::Column),
            ParamSpec::required("target_column", "Target Column Name", ParamKind::Text)
                .with_default(json!("date_difference")),
            ParamSpec::required("unit", "Time Unit", ParamKind::Select)
                .with_options(UNITS)
                .with_default(json!("days")),
            ParamSpec::optional("absolute_value", "Use Absolute Value", ParamKind::Bool)
                .with_default(json!(false))
                .with_help("Negative differences become positive"),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let start_column = params.required_str("start_column", "Start Date Column")?;
        let end_column = params.required_str("end_column", "End Date Column")?;
        let target = target_name(params.str("target_column"))?;
        let unit = params.required_str("unit", "Time Unit")?;
        let absolute = params.bool_or("absolute_value", false);

        let divisor = match unit {
            "seconds" => 1.0,
            "minutes" => 60.0,
            "hours" => 3_600.0,
            "days" => 86_400.0,
            "weeks" => 604_800.0,
            // Average month and year lengths.
            "months" => 86_400.0 * 30.44,
            _ => 86_400.0 * 365.25,
        };

        let starts = datetime_values(require_column(&table.data, start_column)?, None);
        let ends = datetime_values(require_column(&table.data, end_column)?, None);

        let values: Vec<Option<f64>> = starts
            .iter()
            .zip(ends.iter())
            .map(|(start, end)| match (start, end) {
                (Some(start), Some(end)) => {
                    let seconds = (*end - *start).num_milliseconds() as f64 / 1_000.0;
                    let mut diff = seconds / divisor;
                    if absolute {
                        diff = diff.abs();
                    }
                    Some((diff * 100.0).round() / 100.0)
                }
                _ => None,
            })
            .collect();

        with_series(table, Series::new(target.as_str().into(), values))
    }
}
