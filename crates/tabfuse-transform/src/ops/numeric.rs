//! Numeric scaling, binning, and arithmetic transformations.

use polars::prelude::*;
use serde_json::json;

use tabfuse_model::Table;
use tabfuse_model::value::format_numeric;

use crate::data_utils::{coerce_numeric, require_column, target_name, with_series};
use crate::error::{Result, TransformError};
use crate::param::{ParamKind, ParamSpec, Params};
use crate::registry::Transform;

/// Numeric cells with non-finite values treated as missing.
fn finite_values(series: &Series) -> Vec<Option<f64>> {
    coerce_numeric(series)
        .into_iter()
        .map(|cell| cell.filter(|v| v.is_finite()))
        .collect()
}

fn present(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().copied().flatten().collect()
}

const SCALING_METHODS: &[&str] = &["min_max", "z_score", "max_abs", "custom_range"];

/// Rescale a numeric column with min-max, z-score, max-abs, or a custom
/// target range.
pub struct NumericScaling;

impl Transform for NumericScaling {
    fn name(&self) -> &'static str {
        "numeric_scaling"
    }

    fn description(&self) -> &'static str {
        "Scale numeric data using various methods (min-max, z-score, etc.)"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("column", "Column", ParamKind::Column),
            ParamSpec::required("method", "Scaling Method", ParamKind::Select)
                .with_options(SCALING_METHODS)
                .with_default(json!("min_max")),
            ParamSpec::optional("min_value", "Min Value (for Custom Range)", ParamKind::Number)
                .with_default(json!(0)),
            ParamSpec::optional("max_value", "Max Value (for Custom Range)", ParamKind::Number)
                .with_default(json!(100)),
            ParamSpec::optional("create_new_column", "Create New Column", ParamKind::Bool)
                .with_default(json!(true)),
            ParamSpec::optional("new_column_name", "New Column Name", ParamKind::Text)
                .with_help("Leave blank to auto-generate based on method"),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let column = params.required_str("column", "Column")?;
        let method = params.required_str("method", "Scaling Method")?;
        let create_new = params.bool_or("create_new_column", true);

        let values = finite_values(require_column(&table.data, column)?);
        let data = present(&values);
        if data.is_empty() {
            return Err(TransformError::NoNumericData {
                column: column.to_string(),
            });
        }

        let target = if create_new {
            match params.str("new_column_name").map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => {
                    let suffix = match method {
                        "min_max" => "scaled",
                        "z_score" => "zscore",
                        "max_abs" => "maxabs",
                        _ => "custom",
                    };
                    format!("{column}_{suffix}")
                }
            }
        } else {
            column.to_string()
        };

        let min = data.iter().copied().fold(f64::INFINITY, f64::min);
        let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let scale: Box<dyn Fn(f64) -> f64> = match method {
            "min_max" => {
                if min == max {
                    Box::new(|_| 0.5)
                } else {
                    Box::new(move |v| (v - min) / (max - min))
                }
            }
            "z_score" => {
                let mean = data.iter().sum::<f64>() / data.len() as f64;
                let std = sample_std(&data, mean);
                if std == 0.0 {
                    Box::new(|_| 0.0)
                } else {
                    Box::new(move |v| (v - mean) / std)
                }
            }
            "max_abs" => {
                let denom = min.abs().max(max.abs());
                if denom == 0.0 {
                    Box::new(|_| 0.0)
                } else {
                    Box::new(move |v| v / denom)
                }
            }
            _ => {
                let lo = params.f64_or("min_value", 0.0);
                let hi = params.f64_or("max_value", 100.0);
                if min == max {
                    let middle = (lo + hi) / 2.0;
                    Box::new(move |_| middle)
                } else {
                    Box::new(move |v| (v - min) / (max - min) * (hi - lo) + lo)
                }
            }
        };

        let scaled: Vec<Option<f64>> = values.iter().map(|cell| cell.map(&scale)).collect();
        with_series(table, Series::new(target.as_str().into(), scaled))
    }
}

/// Sample standard deviation; a single observation counts as zero spread.
fn sample_std(data: &[f64], mean: f64) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }
    let var = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (data.len() - 1) as f64;
    var.sqrt()
}

const BINNING_METHODS: &[&str] = &["equal_width", "equal_freq", "custom"];

/// Bucket a numeric column into labelled categories.
pub struct Binning;

impl Transform for Binning {
    fn name(&self) -> &'static str {
        "binning"
    }

    fn description(&self) -> &'static str {
        "Create categories or groups from numeric data by binning values"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("column", "Column", ParamKind::Column),
            ParamSpec::required("method", "Binning Method", ParamKind::Select)
                .with_options(BINNING_METHODS)
                .with_default(json!("equal_width")),
            ParamSpec::optional("num_bins", "Number of Bins", ParamKind::Integer)
                .with_default(json!(5)),
            ParamSpec::optional("custom_bins", "Custom Bin Edges", ParamKind::Text)
                .with_help("Comma-separated, e.g. '0,18,35,50,65,100' for age groups"),
            ParamSpec::optional("labels", "Bin Labels", ParamKind::Text)
                .with_help("Comma-separated, e.g. 'Low,Medium,High' for 3 bins"),
            ParamSpec::required("target_column", "Target Column Name", ParamKind::Text),
            ParamSpec::optional("include_right", "Include Right Edge in Bin", ParamKind::Bool)
                .with_default(json!(true))
                .with_help("Checked: bins are (a,b]. Unchecked: [a,b)"),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let column = params.required_str("column", "Column")?;
        let method = params.required_str("method", "Binning Method")?;
        let target = target_name(params.str("target_column"))?;
        let include_right = params.bool_or("include_right", true);

        let labels: Option<Vec<String>> = params
            .str("labels")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.split(',').map(|l| l.trim().to_string()).collect());

        let values = finite_values(require_column(&table.data, column)?);

        let edges = match method {
            "custom" => {
                let raw = params
                    .str("custom_bins")
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        TransformError::invalid("Custom bin edges must be provided")
                    })?;
                let edges = parse_edges(raw)?;
                if let Some(labels) = &labels
                    && labels.len() != edges.len() - 1
                {
                    return Err(TransformError::invalid(format!(
                        "Number of labels ({}) must be one less than bin edges ({})",
                        labels.len(),
                        edges.len()
                    )));
                }
                edges
            }
            "equal_width" => {
                let num_bins = checked_bin_count(params, &labels)?;
                let data = present(&values);
                if data.is_empty() {
                    return Err(TransformError::NoNumericData {
                        column: column.to_string(),
                    });
                }
                equal_width_edges(&data, num_bins, include_right)
            }
            _ => {
                let num_bins = checked_bin_count(params, &labels)?;
                let mut data = present(&values);
                if data.is_empty() {
                    return Err(TransformError::NoNumericData {
                        column: column.to_string(),
                    });
                }
                data.sort_by(f64::total_cmp);
                let mut edges: Vec<f64> = (0..=num_bins)
                    .map(|i| quantile(&data, i as f64 / num_bins as f64))
                    .collect();
                // Repeated quantiles collapse into one edge.
                edges.dedup();
                if edges.len() < 2 {
                    return Err(TransformError::invalid(
                        "Not enough distinct values to form bins",
                    ));
                }
                if let Some(labels) = &labels
                    && labels.len() != edges.len() - 1
                {
                    return Err(TransformError::invalid(
                        "Bin labels must be one fewer than the number of bin edges",
                    ));
                }
                edges
            }
        };

        // Quantile bins are always right-inclusive.
        let right = if method == "equal_freq" {
            true
        } else {
            include_right
        };
        let assigned = assign_bins(&values, &edges, right);

        let rendered: Vec<Option<String>> = assigned
            .iter()
            .map(|cell| {
                cell.map(|idx| match &labels {
                    Some(labels) => labels[idx].clone(),
                    None => interval_label(edges[idx], edges[idx + 1], right),
                })
            })
            .collect();

        with_series(table, Series::new(target.as_str().into(), rendered))
    }
}

fn checked_bin_count(params: &Params, labels: &Option<Vec<String>>) -> Result<usize> {
    let requested = params.f64_or("num_bins", 5.0);
    if requested < 2.0 {
        return Err(TransformError::invalid("Number of bins must be at least 2"));
    }
    let num_bins = requested as usize;
    if let Some(labels) = labels
        && labels.len() != num_bins
    {
        return Err(TransformError::invalid(format!(
            "Number of labels ({}) must match number of bins ({num_bins})",
            labels.len()
        )));
    }
    Ok(num_bins)
}

fn parse_edges(raw: &str) -> Result<Vec<f64>> {
    let mut edges = Vec::new();
    for part in raw.split(',') {
        let edge = part.trim().parse::<f64>().map_err(|_| {
            TransformError::invalid("Invalid bin edges format. Use comma-separated numbers.")
        })?;
        edges.push(edge);
    }
    if edges.len() < 2 {
        return Err(TransformError::invalid("At least 2 bin edges are required"));
    }
    Ok(edges)
}

/// Evenly spaced edges spanning the data, widened by 0.1% on the open side
/// so the extreme value still lands in a bin.
fn equal_width_edges(data: &[f64], num_bins: usize, include_right: bool) -> Vec<f64> {
    let mut min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        let pad = if min == 0.0 { 0.001 } else { 0.001 * min.abs() };
        min -= pad;
        max += pad;
    }
    let step = (max - min) / num_bins as f64;
    let mut edges: Vec<f64> = (0..=num_bins).map(|i| min + step * i as f64).collect();
    edges[num_bins] = max;
    let adjust = (max - min) * 0.001;
    if include_right {
        edges[0] -= adjust;
    } else {
        edges[num_bins] += adjust;
    }
    edges
}

/// Linear-interpolated quantile over sorted data.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// Map each value to its bin index, or None when out of range or missing.
fn assign_bins(values: &[Option<f64>], edges: &[f64], right: bool) -> Vec<Option<usize>> {
    values
        .iter()
        .map(|cell| {
            let v = (*cell)?;
            for i in 0..edges.len() - 1 {
                let inside = if right {
                    // First bin keeps its left edge closed.
                    (v > edges[i] || (i == 0 && v >= edges[0])) && v <= edges[i + 1]
                } else {
                    v >= edges[i] && v < edges[i + 1]
                };
                if inside {
                    return Some(i);
                }
            }
            None
        })
        .collect()
}

fn interval_label(lo: f64, hi: f64, right: bool) -> String {
    let lo = format_numeric((lo * 1_000.0).round() / 1_000.0);
    let hi = format_numeric((hi * 1_000.0).round() / 1_000.0);
    if right {
        format!("({lo}, {hi}]")
    } else {
        format!("[{lo}, {hi})")
    }
}

const OPERATIONS: &[&str] = &["basic", "function", "aggregate"];
const OPERATORS: &[&str] = &["+", "-", "*", "/", "%", "**"];
const FUNCTIONS: &[&str] = &[
    "log", "log10", "sqrt", "abs", "exp", "sin", "cos", "tan", "round", "floor", "ceil",
];
const AGGREGATES: &[&str] = &[
    "sum", "mean", "min", "max", "median", "std", "var", "prod",
];

/// Arithmetic against a column or literal, single-column math functions,
/// and row-wise aggregates over a column list.
pub struct MathOperation;

impl Transform for MathOperation {
    fn name(&self) -> &'static str {
        "math_operation"
    }

    fn description(&self) -> &'static str {
        "Apply mathematical operations to create a new column"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("operation", "Operation Type", ParamKind::Select)
                .with_options(OPERATIONS)
                .with_default(json!("basic")),
            ParamSpec::required("column1", "First Column", ParamKind::Column),
            ParamSpec::optional("operator", "Operator", ParamKind::Select)
                .with_options(OPERATORS)
                .with_default(json!("+")),
            ParamSpec::optional("column2", "Second Column", ParamKind::Column),
            ParamSpec::optional("value", "Value (instead of second column)", ParamKind::Number)
                .with_default(json!(0)),
            ParamSpec::optional("use_value", "Use Value instead of Second Column", ParamKind::Bool)
                .with_default(json!(false)),
            ParamSpec::optional("function", "Math Function", ParamKind::Select)
                .with_options(FUNCTIONS)
                .with_default(json!("log")),
            ParamSpec::optional("aggregate_columns", "Columns to Aggregate", ParamKind::Text)
                .with_help("Comma-separated column names"),
            ParamSpec::optional("aggregate_function", "Aggregate Function", ParamKind::Select)
                .with_options(AGGREGATES)
                .with_default(json!("sum")),
            ParamSpec::required("target_column", "Target Column Name", ParamKind::Text)
                .with_default(json!("result")),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let operation = params.required_str("operation", "Operation Type")?;
        let column1 = params.required_str("column1", "First Column")?;
        let target = target_name(params.str("target_column"))?;

        let col1 = finite_values(require_column(&table.data, column1)?);

        let values = match operation {
            "basic" => {
                let operator = params.str("operator").unwrap_or("+");
                basic_operation(table, params, &col1, operator)?
            }
            "function" => {
                let function = params.str("function").unwrap_or("log");
                let apply = function_for(function);
                col1.iter().map(|cell| cell.map(apply)).collect()
            }
            _ => aggregate_operation(table, params, column1, &col1)?,
        };

        with_series(table, Series::new(target.as_str().into(), values))
    }
}

fn basic_operation(
    table: &Table,
    params: &Params,
    col1: &[Option<f64>],
    operator: &str,
) -> Result<Vec<Option<f64>>> {
    let use_value = params.bool_or("use_value", false);
    let column2 = params.str("column2").map(str::trim).filter(|s| !s.is_empty());

    let operands: Vec<Option<f64>> = match column2 {
        Some(name) if !use_value => finite_values(require_column(&table.data, name)?),
        _ => {
            let literal = params.f64_or("value", 0.0);
            if literal == 0.0 && operator == "/" {
                return Err(TransformError::invalid("Cannot divide by zero"));
            }
            if literal == 0.0 && operator == "%" {
                return Err(TransformError::invalid("Cannot take modulo by zero"));
            }
            vec![Some(literal); col1.len()]
        }
    };

    let values = col1
        .iter()
        .zip(operands.iter())
        .map(|(a, b)| {
            let (a, b) = ((*a)?, (*b)?);
            match operator {
                "+" => Some(a + b),
                "-" => Some(a - b),
                "*" => Some(a * b),
                // A zero divisor in the other column marks the row missing.
                "/" => (b != 0.0).then(|| a / b),
                "%" => (b != 0.0).then(|| ((a % b) + b) % b),
                _ => Some(a.powf(b)),
            }
        })
        .collect();
    Ok(values)
}

fn function_for(function: &str) -> fn(f64) -> f64 {
    match function {
        // Non-positive inputs clamp to the smallest positive float.
        "log" => |v: f64| v.max(f64::EPSILON).ln(),
        "log10" => |v: f64| v.max(f64::EPSILON).log10(),
        "sqrt" => |v: f64| v.max(0.0).sqrt(),
        "abs" => f64::abs,
        "exp" => f64::exp,
        "sin" => f64::sin,
        "cos" => f64::cos,
        "tan" => f64::tan,
        "round" => f64::round,
        "floor" => f64::floor,
        _ => f64::ceil,
    }
}

fn aggregate_operation(
    table: &Table,
    params: &Params,
    column1: &str,
    col1: &[Option<f64>],
) -> Result<Vec<Option<f64>>> {
    let raw = params
        .str("aggregate_columns")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TransformError::invalid("Columns to aggregate must be specified"))?;
    let function = params.str("aggregate_function").unwrap_or("sum");

    let mut names: Vec<String> = raw
        .split(',')
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .collect();
    if !names.iter().any(|n| n == column1) {
        names.insert(0, column1.to_string());
    }

    let missing: Vec<&str> = names
        .iter()
        .filter(|n| !table.has_column(n))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        return Err(TransformError::invalid(format!(
            "Columns not found: {}",
            missing.join(", ")
        )));
    }

    let mut columns: Vec<Vec<Option<f64>>> = Vec::with_capacity(names.len());
    for name in &names {
        if name == column1 {
            columns.push(col1.to_vec());
        } else {
            columns.push(finite_values(require_column(&table.data, name)?));
        }
    }

    let rows = table.row_count();
    let mut values = Vec::with_capacity(rows);
    for row in 0..rows {
        let mut cells: Vec<f64> = columns.iter().filter_map(|col| col[row]).collect();
        values.push(aggregate(function, &mut cells));
    }
    Ok(values)
}

/// Row-wise aggregate over the present cells. Sums and products of an
/// all-missing row follow their identity elements; the rest stay missing.
fn aggregate(function: &str, cells: &mut [f64]) -> Option<f64> {
    match function {
        "sum" => Some(cells.iter().sum()),
        "prod" => Some(cells.iter().product()),
        "mean" => mean(cells),
        "min" => cells.iter().copied().reduce(f64::min),
        "max" => cells.iter().copied().reduce(f64::max),
        "median" => {
            if cells.is_empty() {
                return None;
            }
            cells.sort_by(f64::total_cmp);
            let mid = cells.len() / 2;
            if cells.len() % 2 == 0 {
                Some((cells[mid - 1] + cells[mid]) / 2.0)
            } else {
                Some(cells[mid])
            }
        }
        "std" => sample_variance(cells).map(f64::sqrt),
        _ => sample_variance(cells),
    }
}

fn mean(cells: &[f64]) -> Option<f64> {
    if cells.is_empty() {
        None
    } else {
        Some(cells.iter().sum::<f64>() / cells.len() as f64)
    }
}

fn sample_variance(cells: &[f64]) -> Option<f64> {
    if cells.len() < 2 {
        return None;
    }
    let m = mean(cells)?;
    Some(cells.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (cells.len() - 1) as f64)
}

#[cfg(test)]
mod tests {
    use tabfuse_model::value::any_to_string;

    use super::*;

    fn table(df: DataFrame) -> Table {
        Table::new("t.csv", df)
    }

    fn validated(transform: &dyn Transform, raw: serde_json::Value, table: &Table) -> Params {
        Params::validate(&transform.parameters(), raw.as_object().unwrap(), table).unwrap()
    }

    fn column_f64(table: &Table, name: &str) -> Vec<Option<f64>> {
        let series = table.data.column(name).unwrap().as_materialized_series();
        coerce_numeric(series)
    }

    fn column_strings(table: &Table, name: &str) -> Vec<String> {
        let series = table.data.column(name).unwrap().as_materialized_series();
        (0..series.len())
            .map(|i| any_to_string(series.get(i).unwrap()))
            .collect()
    }

    #[test]
    fn test_min_max_scaling() {
        let t = table(df!("v" => [0.0f64, 5.0, 10.0]).unwrap());
        let params = validated(&NumericScaling, json!({"column": "v"}), &t);
        let out = NumericScaling.apply(&t, &params).unwrap();
        assert_eq!(
            column_f64(&out, "v_scaled"),
            vec![Some(0.0), Some(0.5), Some(1.0)]
        );
    }

    #[test]
    fn test_min_max_degenerate_maps_to_half() {
        let t = table(df!("v" => [7.0f64, 7.0, 7.0]).unwrap());
        let params = validated(&NumericScaling, json!({"column": "v"}), &t);
        let out = NumericScaling.apply(&t, &params).unwrap();
        assert_eq!(
            column_f64(&out, "v_scaled"),
            vec![Some(0.5), Some(0.5), Some(0.5)]
        );
    }

    #[test]
    fn test_z_score_zero_spread() {
        let t = table(df!("v" => [3.0f64, 3.0]).unwrap());
        let params = validated(
            &NumericScaling,
            json!({"column": "v", "method": "z_score"}),
            &t,
        );
        let out = NumericScaling.apply(&t, &params).unwrap();
        assert_eq!(column_f64(&out, "v_zscore"), vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn test_custom_range_degenerate_maps_to_midpoint() {
        let t = table(df!("v" => [2.0f64, 2.0]).unwrap());
        let params = validated(
            &NumericScaling,
            json!({"column": "v", "method": "custom_range", "min_value": 10, "max_value": 20}),
            &t,
        );
        let out = NumericScaling.apply(&t, &params).unwrap();
        assert_eq!(column_f64(&out, "v_custom"), vec![Some(15.0), Some(15.0)]);
    }

    #[test]
    fn test_scaling_in_place_and_missing_passthrough() {
        let t = table(df!("v" => [Some(0.0f64), None, Some(10.0)]).unwrap());
        let params = validated(
            &NumericScaling,
            json!({"column": "v", "create_new_column": false}),
            &t,
        );
        let out = NumericScaling.apply(&t, &params).unwrap();
        assert_eq!(out.column_count(), 1);
        assert_eq!(column_f64(&out, "v"), vec![Some(0.0), None, Some(1.0)]);
    }

    #[test]
    fn test_scaling_rejects_non_numeric_column() {
        let t = table(df!("v" => ["a", "b"]).unwrap());
        let params = validated(&NumericScaling, json!({"column": "v"}), &t);
        let err = NumericScaling.apply(&t, &params).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Column 'v' does not contain valid numeric data"
        );
    }

    #[test]
    fn test_binning_custom_edges_with_labels() {
        let t = table(df!("age" => [5.0f64, 25.0, 40.0, 60.0, 80.0, 110.0]).unwrap());
        let params = validated(
            &Binning,
            json!({
                "column": "age",
                "method": "custom",
                "custom_bins": "0,18,35,50,65,100",
                "labels": "child,young,middle,senior,elder",
                "target_column": "group"
            }),
            &t,
        );
        let out = Binning.apply(&t, &params).unwrap();
        assert_eq!(
            column_strings(&out, "group"),
            vec!["child", "young", "middle", "senior", "elder", ""]
        );
    }

    #[test]
    fn test_binning_custom_edges_without_labels() {
        let t = table(df!("age" => [5.0f64, 25.0, 40.0, 60.0, 80.0]).unwrap());
        let params = validated(
            &Binning,
            json!({
                "column": "age",
                "method": "custom",
                "custom_bins": "0,18,35,50,65,100",
                "target_column": "group"
            }),
            &t,
        );
        let out = Binning.apply(&t, &params).unwrap();
        assert_eq!(
            column_strings(&out, "group"),
            vec!["(0, 18]", "(18, 35]", "(35, 50]", "(50, 65]", "(65, 100]"]
        );
    }

    #[test]
    fn test_binning_label_count_mismatch() {
        let t = table(df!("age" => [5.0f64]).unwrap());
        let params = validated(
            &Binning,
            json!({
                "column": "age",
                "method": "custom",
                "custom_bins": "0,18,35,50,65,100",
                "labels": "a,b,c,d",
                "target_column": "group"
            }),
            &t,
        );
        let err = Binning.apply(&t, &params).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Number of labels (4) must be one less than bin edges (6)"
        );
    }

    #[test]
    fn test_binning_requires_two_bins() {
        let t = table(df!("v" => [1.0f64, 2.0]).unwrap());
        let params = validated(
            &Binning,
            json!({"column": "v", "num_bins": 1, "target_column": "b"}),
            &t,
        );
        let err = Binning.apply(&t, &params).unwrap_err();
        assert_eq!(err.to_string(), "Number of bins must be at least 2");
    }

    #[test]
    fn test_binning_equal_width_includes_extremes() {
        let t = table(df!("v" => [0.0f64, 2.5, 5.0, 7.5, 10.0]).unwrap());
        let params = validated(
            &Binning,
            json!({"column": "v", "num_bins": 2, "labels": "low,high", "target_column": "b"}),
            &t,
        );
        let out = Binning.apply(&t, &params).unwrap();
        assert_eq!(
            column_strings(&out, "b"),
            vec!["low", "low", "low", "high", "high"]
        );
    }

    #[test]
    fn test_binning_equal_freq_drops_duplicate_edges() {
        let t = table(df!("v" => [1.0f64, 1.0, 1.0, 1.0, 2.0, 3.0]).unwrap());
        let params = validated(
            &Binning,
            json!({"column": "v", "method": "equal_freq", "num_bins": 3, "target_column": "b"}),
            &t,
        );
        let out = Binning.apply(&t, &params).unwrap();
        let rendered = column_strings(&out, "b");
        // Four identical values collapse the lower quantile edges into one.
        assert_eq!(rendered.iter().filter(|v| !v.is_empty()).count(), 6);
        let distinct: std::collections::BTreeSet<&String> = rendered.iter().collect();
        assert_eq!(distinct.len(), 2);
    }

    #[test]
    fn test_math_divide_by_literal_zero_fails() {
        let t = table(df!("v" => [1.0f64, 2.0]).unwrap());
        let params = validated(
            &MathOperation,
            json!({
                "column1": "v",
                "operator": "/",
                "use_value": true,
                "value": 0,
                "target_column": "out"
            }),
            &t,
        );
        let err = MathOperation.apply(&t, &params).unwrap_err();
        assert_eq!(err.to_string(), "Cannot divide by zero");
    }

    #[test]
    fn test_math_divide_by_zero_column_marks_rows_missing() {
        let t = table(
            df!(
                "a" => [10.0f64, 20.0, 30.0],
                "b" => [2.0f64, 0.0, 5.0],
            )
            .unwrap(),
        );
        let params = validated(
            &MathOperation,
            json!({"column1": "a", "operator": "/", "column2": "b", "target_column": "q"}),
            &t,
        );
        let out = MathOperation.apply(&t, &params).unwrap();
        assert_eq!(column_f64(&out, "q"), vec![Some(5.0), None, Some(6.0)]);
    }

    #[test]
    fn test_math_modulo_follows_divisor_sign() {
        let t = table(df!("v" => [-7.0f64, 7.0]).unwrap());
        let params = validated(
            &MathOperation,
            json!({
                "column1": "v",
                "operator": "%",
                "use_value": true,
                "value": 3,
                "target_column": "m"
            }),
            &t,
        );
        let out = MathOperation.apply(&t, &params).unwrap();
        assert_eq!(column_f64(&out, "m"), vec![Some(2.0), Some(1.0)]);
    }

    #[test]
    fn test_math_log_clamps_non_positive() {
        let t = table(df!("v" => [0.0f64, 1.0]).unwrap());
        let params = validated(
            &MathOperation,
            json!({"column1": "v", "operation": "function", "target_column": "l"}),
            &t,
        );
        let out = MathOperation.apply(&t, &params).unwrap();
        let values = column_f64(&out, "l");
        assert_eq!(values[0], Some(f64::EPSILON.ln()));
        assert_eq!(values[1], Some(0.0));
    }

    #[test]
    fn test_math_aggregate_prepends_first_column() {
        let t = table(
            df!(
                "a" => [1.0f64, 4.0],
                "b" => [2.0f64, 5.0],
                "c" => [3.0f64, 6.0],
            )
            .unwrap(),
        );
        let params = validated(
            &MathOperation,
            json!({
                "column1": "a",
                "operation": "aggregate",
                "aggregate_columns": "b,c",
                "aggregate_function": "mean",
                "target_column": "avg"
            }),
            &t,
        );
        let out = MathOperation.apply(&t, &params).unwrap();
        assert_eq!(column_f64(&out, "avg"), vec![Some(2.0), Some(5.0)]);
    }

    #[test]
    fn test_math_aggregate_reports_missing_columns() {
        let t = table(df!("a" => [1.0f64]).unwrap());
        let params = validated(
            &MathOperation,
            json!({
                "column1": "a",
                "operation": "aggregate",
                "aggregate_columns": "b, c",
                "target_column": "s"
            }),
            &t,
        );
        let err = MathOperation.apply(&t, &params).unwrap_err();
        assert_eq!(err.to_string(), "Columns not found: b, c");
    }

    #[test]
    fn test_math_aggregate_sum_identity_on_missing_row() {
        let t = table(
            df!(
                "a" => [Some(1.0f64), None],
                "b" => [Some(2.0f64), None],
            )
            .unwrap(),
        );
        let params = validated(
            &MathOperation,
            json!({
                "column1": "a",
                "operation": "aggregate",
                "aggregate_columns": "a,b",
                "target_column": "s"
            }),
            &t,
        );
        let out = MathOperation.apply(&t, &params).unwrap();
        assert_eq!(column_f64(&out, "s"), vec![Some(3.0), Some(0.0)]);
    }
}
