//! Per-table cleaning ahead of a merge.
//!
//! Cleaning runs in a fixed order: column names are lowercased (when
//! case is ignored), missing values are filled per the chosen
//! strategy, then duplicate rows are dropped keeping the first
//! occurrence. Fill strategies that only make sense for numbers leave
//! other columns untouched.

use std::collections::{BTreeMap, HashMap, HashSet};

use polars::prelude::*;

use tabfuse_model::{
    Diagnostic, DiagnosticList, FillStrategy, MergeOptions, MergeStrategy, Table, any_to_string,
    is_numeric_dtype, parse_bool, parse_f64,
};

use crate::error::Result;

/// Rows removed by duplicate dropping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateReport {
    pub count: usize,
    /// Zero-based indices of the removed rows in the pre-drop table.
    pub indices: Vec<usize>,
}

/// Clean one table according to the merge options.
///
/// The key is the already case-normalized join key; duplicate dropping
/// restricts itself to that column only for join merges where the
/// table actually has it.
pub fn clean_table(
    table: Table,
    options: &MergeOptions,
    key: Option<&str>,
) -> Result<(Table, DiagnosticList)> {
    let mut diagnostics = DiagnosticList::new();
    let label = table.label.clone();
    let mut df = table.data;

    if options.ignore_case {
        lowercase_columns(&mut df)?;
    }

    df = fill_missing(df, options.fill_strategy, options.fill_value.as_deref())?;

    if options.drop_duplicates {
        let subset: Option<Vec<String>> = match (options.strategy, key) {
            (MergeStrategy::Join, Some(k)) if df.column(k).is_ok() => Some(vec![k.to_string()]),
            _ => None,
        };
        let (deduped, report) = drop_duplicate_rows(&df, subset.as_deref())?;
        if report.count > 0 {
            tracing::debug!(label = %label, removed = report.count, "dropped duplicate rows");
            diagnostics.push(
                Diagnostic::info(format!(
                    "Removed {} duplicate rows from '{label}'",
                    report.count
                ))
                .with_source(label.clone()),
            );
        }
        df = deduped;
    }

    Ok((Table::new(label, df), diagnostics))
}

/// Lowercase column names, de-clashing collisions with numeric suffixes.
fn lowercase_columns(df: &mut DataFrame) -> Result<()> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names: Vec<String> = Vec::with_capacity(df.width());
    for name in df.get_column_names() {
        let base = name.to_lowercase();
        let mut candidate = base.clone();
        let mut n = 2;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{base}_{n}");
            n += 1;
        }
        names.push(candidate);
    }
    df.set_column_names(names)?;
    Ok(())
}

fn fill_missing(df: DataFrame, strategy: FillStrategy, custom: Option<&str>) -> Result<DataFrame> {
    if matches!(strategy, FillStrategy::None) {
        return Ok(df);
    }
    let mut columns: Vec<Column> = Vec::with_capacity(df.width());
    for column in df.get_columns() {
        let series = column.as_materialized_series();
        let filled = if series.null_count() == 0 {
            series.clone()
        } else {
            fill_series(series, strategy, custom)?
        };
        columns.push(filled.into());
    }
    Ok(DataFrame::new(columns)?)
}

fn fill_series(series: &Series, strategy: FillStrategy, custom: Option<&str>) -> Result<Series> {
    let filled = match strategy {
        FillStrategy::None => series.clone(),
        FillStrategy::Zero => match series.dtype() {
            dt if is_numeric_dtype(dt) => series.fill_null(FillNullStrategy::Zero)?,
            DataType::String => {
                let ca = series.str()?;
                ca.set(&ca.is_null(), Some("0"))?.into_series()
            }
            DataType::Boolean => {
                let ca = series.bool()?;
                ca.fill_null_with_values(false)?.into_series()
            }
            _ => series.clone(),
        },
        FillStrategy::Mean => fill_with_statistic(series, |s| s.mean())?,
        FillStrategy::Median => fill_with_statistic(series, |s| s.median())?,
        FillStrategy::Mode => fill_mode(series)?,
        FillStrategy::ForwardFill => series.fill_null(FillNullStrategy::Forward(None))?,
        FillStrategy::BackwardFill => series.fill_null(FillNullStrategy::Backward(None))?,
        FillStrategy::Custom => match custom {
            Some(raw) => fill_custom(series, raw)?,
            None => series.clone(),
        },
    };
    Ok(filled)
}

/// Fill a numeric column with a statistic of its non-missing values.
///
/// Integer columns widen to floats, the same way a mean of integers is
/// generally fractional.
fn fill_with_statistic(series: &Series, statistic: fn(&Series) -> Option<f64>) -> Result<Series> {
    if !is_numeric_dtype(series.dtype()) {
        return Ok(series.clone());
    }
    let as_float = series.cast(&DataType::Float64)?;
    let filled = match statistic(&as_float) {
        Some(value) => {
            let ca = as_float.f64()?;
            ca.fill_null_with_values(value)?.into_series()
        }
        None => series.clone(),
    };
    Ok(filled)
}

/// Most frequent non-missing value; ties take the smallest value.
fn fill_mode(series: &Series) -> Result<Series> {
    let filled = match series.dtype() {
        DataType::Boolean => {
            let ca = series.bool()?;
            let mut trues = 0usize;
            let mut falses = 0usize;
            for v in ca.into_iter().flatten() {
                if v {
                    trues += 1;
                } else {
                    falses += 1;
                }
            }
            if trues + falses == 0 {
                series.clone()
            } else {
                ca.fill_null_with_values(trues > falses)?.into_series()
            }
        }
        DataType::Int64 => {
            let ca = series.i64()?;
            let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
            for v in ca.into_iter().flatten() {
                *counts.entry(v).or_insert(0) += 1;
            }
            match mode_of(&counts) {
                Some(mode) => ca.fill_null_with_values(mode)?.into_series(),
                None => series.clone(),
            }
        }
        DataType::Float64 => {
            let ca = series.f64()?;
            let mut counts: HashMap<u64, (f64, usize)> = HashMap::new();
            for v in ca.into_iter().flatten() {
                counts.entry(v.to_bits()).or_insert((v, 0)).1 += 1;
            }
            let mut entries: Vec<(f64, usize)> = counts.into_values().collect();
            entries.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
            let mut best: Option<(f64, usize)> = None;
            for (value, count) in entries {
                if best.is_none_or(|(_, c)| count > c) {
                    best = Some((value, count));
                }
            }
            match best {
                Some((mode, _)) => ca.fill_null_with_values(mode)?.into_series(),
                None => series.clone(),
            }
        }
        DataType::String => {
            let ca = series.str()?;
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for v in ca.into_iter().flatten() {
                *counts.entry(v).or_insert(0) += 1;
            }
            match mode_of(&counts) {
                Some(mode) => ca.set(&ca.is_null(), Some(mode))?.into_series(),
                None => series.clone(),
            }
        }
        DataType::Datetime(time_unit, time_zone) => {
            let ca = series.datetime()?;
            let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
            for v in ca.phys.iter().flatten() {
                *counts.entry(v).or_insert(0) += 1;
            }
            match mode_of(&counts) {
                Some(mode) => ca
                    .phys
                    .fill_null_with_values(mode)?
                    .into_datetime(*time_unit, time_zone.clone())
                    .into_series(),
                None => series.clone(),
            }
        }
        _ => series.clone(),
    };
    Ok(filled)
}

/// First key with the highest count. BTreeMap iteration is ascending,
/// so strictly-greater comparisons keep the smallest winner.
fn mode_of<K: Copy + Ord>(counts: &BTreeMap<K, usize>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, c)) if *count <= c => {}
            _ => best = Some((*value, *count)),
        }
    }
    best.map(|(value, _)| value)
}

fn fill_custom(series: &Series, raw: &str) -> Result<Series> {
    let numeric = parse_f64(raw);
    let filled = match series.dtype() {
        DataType::Int64 => match numeric {
            Some(v) if v.fract() == 0.0 => {
                let ca = series.i64()?;
                ca.fill_null_with_values(v as i64)?.into_series()
            }
            Some(v) => {
                let as_float = series.cast(&DataType::Float64)?;
                let ca = as_float.f64()?;
                ca.fill_null_with_values(v)?.into_series()
            }
            None => series.clone(),
        },
        dt if is_numeric_dtype(dt) => match numeric {
            Some(v) => {
                let as_float = series.cast(&DataType::Float64)?;
                let ca = as_float.f64()?;
                ca.fill_null_with_values(v)?.into_series()
            }
            None => series.clone(),
        },
        DataType::String => {
            let ca = series.str()?;
            ca.set(&ca.is_null(), Some(raw))?.into_series()
        }
        DataType::Boolean => match parse_bool(raw) {
            Some(b) => {
                let ca = series.bool()?;
                ca.fill_null_with_values(b)?.into_series()
            }
            None => series.clone(),
        },
        _ => series.clone(),
    };
    Ok(filled)
}

/// Drop duplicate rows, keeping the first occurrence.
///
/// Rows are compared by the stringified values of the subset columns,
/// or of every column when no subset is given. Missing cells compare
/// equal to each other but not to empty text.
pub fn drop_duplicate_rows(
    df: &DataFrame,
    subset: Option<&[String]>,
) -> Result<(DataFrame, DuplicateReport)> {
    let names: Vec<String> = match subset {
        Some(cols) => cols.to_vec(),
        None => df.get_column_names().iter().map(|n| n.to_string()).collect(),
    };
    let mut key_columns = Vec::with_capacity(names.len());
    for name in &names {
        key_columns.push(df.column(name)?.as_materialized_series());
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(df.height());
    let mut report = DuplicateReport::default();
    for row in 0..df.height() {
        let mut key = String::new();
        for series in &key_columns {
            let value = series.get(row).unwrap_or(AnyValue::Null);
            if matches!(value, AnyValue::Null) {
                key.push('\u{0}');
            } else {
                key.push_str(&any_to_string(value));
            }
            key.push('\u{1f}');
        }
        if seen.insert(key) {
            keep.push(true);
        } else {
            keep.push(false);
            report.indices.push(row);
        }
    }
    report.count = report.indices.len();

    if report.count == 0 {
        return Ok((df.clone(), report));
    }
    let mask = BooleanChunked::from_slice(PlSmallStr::EMPTY, &keep);
    Ok((df.filter(&mask)?, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_col(name: &str, values: Vec<Option<i64>>) -> Column {
        Series::new(name.into(), values).into()
    }

    fn str_col(name: &str, values: Vec<Option<&str>>) -> Column {
        Series::new(name.into(), values).into()
    }

    fn float_col(name: &str, values: Vec<Option<f64>>) -> Column {
        Series::new(name.into(), values).into()
    }

    #[test]
    fn test_lowercase_with_collision_suffix() {
        let mut df = DataFrame::new(vec![
            int_col("ID", vec![Some(1)]),
            int_col("Id", vec![Some(2)]),
            int_col("Name", vec![Some(3)]),
        ])
        .unwrap();
        lowercase_columns(&mut df).unwrap();
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["id", "id_2", "name"]);
    }

    #[test]
    fn test_zero_fill_per_dtype() {
        let df = DataFrame::new(vec![
            int_col("n", vec![Some(1), None]),
            str_col("s", vec![Some("a"), None]),
        ])
        .unwrap();
        let filled = fill_missing(df, FillStrategy::Zero, None).unwrap();
        assert_eq!(
            filled.column("n").unwrap().i64().unwrap().get(1),
            Some(0)
        );
        assert_eq!(
            filled.column("s").unwrap().str().unwrap().get(1),
            Some("0")
        );
    }

    #[test]
    fn test_mean_fill_widens_integers() {
        let df = DataFrame::new(vec![int_col("n", vec![Some(1), None, Some(3)])]).unwrap();
        let filled = fill_missing(df, FillStrategy::Mean, None).unwrap();
        let col = filled.column("n").unwrap();
        assert_eq!(col.dtype(), &DataType::Float64);
        assert_eq!(col.f64().unwrap().get(1), Some(2.0));
    }

    #[test]
    fn test_median_fill() {
        let df = DataFrame::new(vec![float_col(
            "x",
            vec![Some(1.0), None, Some(100.0), Some(3.0)],
        )])
        .unwrap();
        let filled = fill_missing(df, FillStrategy::Median, None).unwrap();
        assert_eq!(filled.column("x").unwrap().f64().unwrap().get(1), Some(3.0));
    }

    #[test]
    fn test_mode_fill_prefers_smallest_on_tie() {
        let df = DataFrame::new(vec![
            str_col("winner", vec![Some("b"), Some("b"), Some("a"), None]),
            str_col("tied", vec![Some("b"), Some("a"), None, None]),
        ])
        .unwrap();
        let filled = fill_missing(df, FillStrategy::Mode, None).unwrap();
        assert_eq!(
            filled.column("winner").unwrap().str().unwrap().get(3),
            Some("b")
        );
        assert_eq!(
            filled.column("tied").unwrap().str().unwrap().get(2),
            Some("a")
        );
    }

    #[test]
    fn test_forward_fill_leaves_leading_missing() {
        let df = DataFrame::new(vec![int_col("n", vec![None, Some(2), None, Some(4)])]).unwrap();
        let filled = fill_missing(df, FillStrategy::ForwardFill, None).unwrap();
        let values: Vec<Option<i64>> = filled.column("n").unwrap().i64().unwrap().iter().collect();
        assert_eq!(values, vec![None, Some(2), Some(2), Some(4)]);
    }

    #[test]
    fn test_backward_fill_leaves_trailing_missing() {
        let df = DataFrame::new(vec![int_col("n", vec![Some(1), None, Some(3), None])]).unwrap();
        let filled = fill_missing(df, FillStrategy::BackwardFill, None).unwrap();
        let values: Vec<Option<i64>> = filled.column("n").unwrap().i64().unwrap().iter().collect();
        assert_eq!(values, vec![Some(1), Some(3), Some(3), None]);
    }

    #[test]
    fn test_custom_fill_respects_column_types() {
        let df = DataFrame::new(vec![
            int_col("n", vec![Some(1), None]),
            str_col("s", vec![Some("a"), None]),
        ])
        .unwrap();
        let filled = fill_missing(df, FillStrategy::Custom, Some("7")).unwrap();
        assert_eq!(filled.column("n").unwrap().dtype(), &DataType::Int64);
        assert_eq!(filled.column("n").unwrap().i64().unwrap().get(1), Some(7));
        assert_eq!(filled.column("s").unwrap().str().unwrap().get(1), Some("7"));
    }

    #[test]
    fn test_custom_fractional_fill_widens_integers() {
        let df = DataFrame::new(vec![int_col("n", vec![Some(1), None])]).unwrap();
        let filled = fill_missing(df, FillStrategy::Custom, Some("2.5")).unwrap();
        assert_eq!(filled.column("n").unwrap().dtype(), &DataType::Float64);
        assert_eq!(filled.column("n").unwrap().f64().unwrap().get(1), Some(2.5));
    }

    #[test]
    fn test_custom_text_fill_skips_numeric_columns() {
        let df = DataFrame::new(vec![int_col("n", vec![Some(1), None])]).unwrap();
        let filled = fill_missing(df, FillStrategy::Custom, Some("unknown")).unwrap();
        assert_eq!(filled.column("n").unwrap().null_count(), 1);
    }

    #[test]
    fn test_drop_duplicates_keeps_first_and_reports_indices() {
        let df = DataFrame::new(vec![
            int_col("id", vec![Some(1), Some(2), Some(3), Some(3), Some(4)]),
            str_col("v", vec![Some("a"), Some("b"), Some("c"), Some("c"), Some("d")]),
        ])
        .unwrap();
        let (deduped, report) = drop_duplicate_rows(&df, None).unwrap();
        assert_eq!(deduped.height(), 4);
        assert_eq!(report.count, 1);
        assert_eq!(report.indices, vec![3]);
    }

    #[test]
    fn test_drop_duplicates_with_key_subset() {
        let df = DataFrame::new(vec![
            int_col("id", vec![Some(1), Some(1), Some(2)]),
            str_col("v", vec![Some("a"), Some("different"), Some("b")]),
        ])
        .unwrap();
        let subset = vec!["id".to_string()];
        let (deduped, report) = drop_duplicate_rows(&df, Some(&subset)).unwrap();
        assert_eq!(deduped.height(), 2);
        assert_eq!(report.count, 1);
        assert_eq!(
            deduped.column("v").unwrap().str().unwrap().get(0),
            Some("a")
        );
    }

    #[test]
    fn test_missing_and_empty_text_are_distinct() {
        let df = DataFrame::new(vec![str_col("s", vec![None, Some(""), None])]).unwrap();
        let (deduped, report) = drop_duplicate_rows(&df, None).unwrap();
        assert_eq!(deduped.height(), 2);
        assert_eq!(report.indices, vec![2]);
    }

    #[test]
    fn test_clean_table_reports_removed_duplicates() {
        let df = DataFrame::new(vec![int_col("ID", vec![Some(1), Some(1), Some(2)])]).unwrap();
        let options = MergeOptions::new().with_drop_duplicates(true);
        let (table, diagnostics) =
            clean_table(Table::new("dup.csv", df), &options, None).unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_names(), vec!["id"]);
        let messages: Vec<String> = diagnostics.iter().map(|d| d.message.clone()).collect();
        assert_eq!(messages, vec!["Removed 1 duplicate rows from 'dup.csv'"]);
    }
}
