//! Key detection for the smart merge strategy.

use polars::prelude::*;

use tabfuse_model::{Diagnostic, DiagnosticList, JoinKind, Table};

use crate::error::Result;
use crate::{append, join};

/// Merge without configuration: detect a key and outer-join on it, or
/// fall back to appending rows when no column qualifies.
pub fn smart_merge(tables: &[Table]) -> Result<(DataFrame, DiagnosticList)> {
    let mut diagnostics = DiagnosticList::new();
    if tables.len() == 1 {
        return Ok((tables[0].data.clone(), diagnostics));
    }

    match detect_key(tables)? {
        Some(key) => {
            tracing::debug!(key = %key, "smart merge detected a key column");
            diagnostics.push(Diagnostic::info(format!(
                "Smart merge: joining on detected key column '{key}'"
            )));
            let (df, join_diags) = join::join_tables(tables, &key, JoinKind::Outer, None)?;
            diagnostics.append(join_diags);
            Ok((df, diagnostics))
        }
        None => {
            diagnostics.push(Diagnostic::warning(
                "No suitable key column found for joining. Falling back to appending rows.",
            ));
            Ok((append::append_tables(tables)?, diagnostics))
        }
    }
}

/// A column qualifies as the key when every table has it and its
/// non-missing values are unique within each table. Candidates are
/// tried in alphabetical order so detection is deterministic.
fn detect_key(tables: &[Table]) -> Result<Option<String>> {
    let mut common: Vec<String> = tables[0]
        .column_names()
        .into_iter()
        .filter(|name| tables[1..].iter().all(|t| t.has_column(name)))
        .collect();
    common.sort();

    'candidates: for name in common {
        for table in tables {
            let series = table
                .data
                .column(&name)?
                .as_materialized_series()
                .drop_nulls();
            if series.is_empty() || series.n_unique()? != series.len() {
                continue 'candidates;
            }
        }
        return Ok(Some(name));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(label: &str, columns: Vec<Column>) -> Table {
        Table::new(label, DataFrame::new(columns).unwrap())
    }

    #[test]
    fn test_detects_shared_unique_column() {
        let a = table(
            "a.csv",
            vec![
                Series::new("id".into(), vec![1i64, 2]).into(),
                Series::new("x".into(), vec!["p", "p"]).into(),
            ],
        );
        let b = table(
            "b.csv",
            vec![
                Series::new("id".into(), vec![2i64, 3]).into(),
                Series::new("y".into(), vec![5i64, 5]).into(),
            ],
        );

        assert_eq!(detect_key(&[a, b]).unwrap(), Some("id".to_string()));
    }

    #[test]
    fn test_repeated_values_disqualify_a_candidate() {
        let a = table("a.csv", vec![Series::new("id".into(), vec![1i64, 1]).into()]);
        let b = table("b.csv", vec![Series::new("id".into(), vec![2i64, 3]).into()]);

        assert_eq!(detect_key(&[a, b]).unwrap(), None);
    }

    #[test]
    fn test_all_missing_column_cannot_be_the_key() {
        let a = table(
            "a.csv",
            vec![Series::new("id".into(), vec![None::<i64>, None]).into()],
        );
        let b = table("b.csv", vec![Series::new("id".into(), vec![1i64, 2]).into()]);

        assert_eq!(detect_key(&[a, b]).unwrap(), None);
    }

    #[test]
    fn test_tied_candidates_resolve_alphabetically() {
        let a = table(
            "a.csv",
            vec![
                Series::new("id".into(), vec![1i64, 2]).into(),
                Series::new("code".into(), vec!["a", "b"]).into(),
            ],
        );
        let b = table(
            "b.csv",
            vec![
                Series::new("id".into(), vec![3i64, 4]).into(),
                Series::new("code".into(), vec!["c", "d"]).into(),
            ],
        );

        assert_eq!(detect_key(&[a, b]).unwrap(), Some("code".to_string()));
    }

    #[test]
    fn test_no_common_columns_falls_back_to_append() {
        let a = table("a.csv", vec![Series::new("x".into(), vec![1i64]).into()]);
        let b = table("b.csv", vec![Series::new("y".into(), vec![2i64]).into()]);

        let (df, diagnostics) = smart_merge(&[a, b]).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(diagnostics.warning_count(), 1);
    }

    #[test]
    fn test_single_table_is_returned_unchanged() {
        let a = table(
            "a.csv",
            vec![Series::new("x".into(), vec![1i64, 2, 3]).into()],
        );
        let (df, diagnostics) = smart_merge(&[a]).unwrap();
        assert_eq!(df.shape(), (3, 1));
        assert!(diagnostics.is_empty());
    }
}
