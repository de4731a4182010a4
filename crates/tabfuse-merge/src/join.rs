//! Sequential key joins with collision suffixes and fuzzy renames.
//!
//! Tables join pairwise left to right: the accumulated result joins
//! the next table, and so on. Rows match on the stringified key value,
//! so an integer 1 matches a float 1.0. Missing keys never match
//! anything, duplicate keys multiply matching rows out pairwise.

use std::collections::HashMap;

use polars::prelude::*;

use tabfuse_model::{Diagnostic, DiagnosticList, JoinKind, Table, any_to_string};
use tabfuse_reconcile::suggest_mapping;

use crate::append::unify_dtypes;
use crate::error::Result;

/// Join cleaned tables on a shared key column.
///
/// The caller has already verified the key exists in every table. The
/// `fuzzy_threshold` enables renaming of unmatched later-table columns
/// onto close accumulated names before each pairwise join.
pub fn join_tables(
    tables: &[Table],
    key: &str,
    kind: JoinKind,
    fuzzy_threshold: Option<f64>,
) -> Result<(DataFrame, DiagnosticList)> {
    let mut diagnostics = DiagnosticList::new();
    let mut merged = tables[0].data.clone();

    for (offset, table) in tables.iter().enumerate().skip(1) {
        let mut right = table.data.clone();
        if let Some(threshold) = fuzzy_threshold {
            rename_close_columns(
                &merged,
                &mut right,
                key,
                threshold,
                &table.label,
                &mut diagnostics,
            )?;
        }
        merged = join_pair(&merged, &right, key, kind, offset)?;
    }

    Ok((merged, diagnostics))
}

/// Rename right-hand columns onto close accumulated names.
///
/// Every accumulated column is matched against the right table's
/// columns; each winning right column is renamed to align with it.
/// Identity matches, renames of the key itself, and renames that would
/// collide with a column the right table already has are skipped.
fn rename_close_columns(
    merged: &DataFrame,
    right: &mut DataFrame,
    key: &str,
    threshold: f64,
    label: &str,
    diagnostics: &mut DiagnosticList,
) -> Result<()> {
    let merged_names: Vec<String> = merged
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    let mut right_names: Vec<String> = right
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();

    let mapping = suggest_mapping(&merged_names, &right_names, threshold);
    for entry in mapping.iter() {
        if entry.source == entry.target || entry.source == key {
            continue;
        }
        // An earlier rename may have consumed the source or occupied
        // the target.
        if !right_names.contains(&entry.source) || right_names.contains(&entry.target) {
            continue;
        }
        right.rename(&entry.source, entry.target.as_str().into())?;
        if let Some(slot) = right_names.iter_mut().find(|n| **n == entry.source) {
            *slot = entry.target.clone();
        }
        tracing::debug!(label, from = %entry.source, to = %entry.target, score = entry.score, "fuzzy column rename");
        diagnostics.push(
            Diagnostic::info(format!(
                "Fuzzy matching renamed '{}' to '{}' in '{label}'",
                entry.source, entry.target
            ))
            .with_source(label.to_string()),
        );
    }
    Ok(())
}

fn join_pair(
    left: &DataFrame,
    right: &DataFrame,
    key: &str,
    kind: JoinKind,
    offset: usize,
) -> Result<DataFrame> {
    let left_key = left.column(key)?.as_materialized_series();
    let right_key = right.column(key)?.as_materialized_series();

    let mut right_rows: HashMap<String, Vec<usize>> = HashMap::new();
    for row in 0..right.height() {
        if let Some(k) = key_string(right_key, row) {
            right_rows.entry(k).or_default().push(row);
        }
    }

    let mut pairs: Vec<(Option<usize>, Option<usize>)> = Vec::new();
    let mut right_used = vec![false; right.height()];
    for row in 0..left.height() {
        let matched = key_string(left_key, row).and_then(|k| right_rows.get(&k));
        match matched {
            Some(rows) => {
                for &r in rows {
                    right_used[r] = true;
                    pairs.push((Some(row), Some(r)));
                }
            }
            None => match kind {
                JoinKind::Inner => {}
                JoinKind::Left | JoinKind::Outer => pairs.push((Some(row), None)),
            },
        }
    }
    if matches!(kind, JoinKind::Outer) {
        for (row, used) in right_used.iter().enumerate() {
            if !used {
                pairs.push((None, Some(row)));
            }
        }
    }

    let left_idx: IdxCa = pairs
        .iter()
        .map(|(l, _)| l.map(|i| i as IdxSize))
        .collect();
    let right_idx: IdxCa = pairs
        .iter()
        .map(|(_, r)| r.map(|i| i as IdxSize))
        .collect();

    let mut columns: Vec<Column> = Vec::with_capacity(left.width() + right.width());
    let mut names: Vec<String> = Vec::with_capacity(left.width() + right.width());

    for column in left.get_columns() {
        let name = column.name().to_string();
        if name == key {
            columns.push(coalesced_key(left_key, right_key, &pairs, key)?.into());
        } else {
            columns.push(column.as_materialized_series().take(&left_idx)?.into());
        }
        names.push(name);
    }

    for column in right.get_columns() {
        if column.name().as_str() == key {
            continue;
        }
        let mut name = column.name().to_string();
        while names.contains(&name) {
            name = format!("{name}_{offset}");
        }
        let series = column
            .as_materialized_series()
            .take(&right_idx)?
            .with_name(name.as_str().into());
        names.push(name);
        columns.push(series.into());
    }

    Ok(DataFrame::new(columns)?)
}

/// Key column of the joined frame, taking the left value where a left
/// row exists and the right value for right-only rows.
fn coalesced_key(
    left_key: &Series,
    right_key: &Series,
    pairs: &[(Option<usize>, Option<usize>)],
    key: &str,
) -> Result<Series> {
    let values: Vec<AnyValue> = pairs
        .iter()
        .map(|(l, r)| match (l, r) {
            (Some(i), _) => left_key.get(*i).unwrap_or(AnyValue::Null),
            (None, Some(j)) => right_key.get(*j).unwrap_or(AnyValue::Null),
            (None, None) => AnyValue::Null,
        })
        .collect();
    let target = unify_dtypes(left_key.dtype(), right_key.dtype());
    let series = Series::from_any_values(key.into(), &values, false)?;
    Ok(series.cast(&target)?)
}

fn key_string(series: &Series, row: usize) -> Option<String> {
    match series.get(row).unwrap_or(AnyValue::Null) {
        AnyValue::Null => None,
        value => Some(any_to_string(value)),
    }
}
