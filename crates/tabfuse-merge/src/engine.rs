//! Merge entry point: cleaning, validation, and strategy dispatch.

use tabfuse_model::{Diagnostic, DiagnosticList, MergeOptions, MergeStrategy, Table};
use tabfuse_reconcile::suggest_for;

use crate::error::{KeyProblem, MergeError, Result};
use crate::{append, clean, join, smart};

/// Similarity floor for key suggestions in error messages.
const SUGGESTION_CUTOFF: f64 = 0.6;

/// At most this many suggested columns per missing key.
const MAX_SUGGESTIONS: usize = 3;

/// A merged table plus everything worth telling the user about.
#[derive(Debug)]
pub struct MergeOutcome {
    pub table: Table,
    pub diagnostics: DiagnosticList,
}

/// Merge a batch of tables under one set of options.
///
/// Every table is cleaned first, then the strategy runs over the
/// cleaned batch. Failures are atomic: a missing join key in any table
/// aborts the whole merge before any joining starts.
pub fn merge(tables: Vec<Table>, options: &MergeOptions) -> Result<MergeOutcome> {
    if tables.is_empty() {
        return Err(MergeError::NoTables);
    }
    let table_count = tables.len();

    let key = options.join_key.as_deref().map(|k| {
        if options.ignore_case {
            k.to_lowercase()
        } else {
            k.to_string()
        }
    });

    let mut diagnostics = DiagnosticList::new();
    let mut cleaned = Vec::with_capacity(table_count);
    for table in tables {
        let (table, table_diags) = clean::clean_table(table, options, key.as_deref())?;
        diagnostics.append(table_diags);
        cleaned.push(table);
    }

    let (df, strategy_diags) = match options.strategy {
        MergeStrategy::Append => (append::append_tables(&cleaned)?, DiagnosticList::new()),
        MergeStrategy::Join => {
            let Some(key) = key.as_deref() else {
                return Err(MergeError::KeyRequired);
            };
            validate_join_key(&cleaned, key)?;
            let threshold = options.fuzzy_matching.then_some(options.fuzzy_threshold);
            join::join_tables(&cleaned, key, options.join_kind, threshold)?
        }
        MergeStrategy::Smart => smart::smart_merge(&cleaned)?,
    };
    diagnostics.append(strategy_diags);

    tracing::info!(
        tables = table_count,
        rows = df.height(),
        columns = df.width(),
        strategy = ?options.strategy,
        "merge complete"
    );
    diagnostics.push(Diagnostic::info(format!(
        "Merged {table_count} tables into {} rows and {} columns",
        df.height(),
        df.width()
    )));

    Ok(MergeOutcome {
        table: Table::new(options.output_name.clone(), df),
        diagnostics,
    })
}

/// Reject the merge when any table lacks the join key, naming close
/// columns from each offending table.
fn validate_join_key(tables: &[Table], key: &str) -> Result<()> {
    let mut problems = Vec::new();
    for table in tables {
        if table.has_column(key) {
            continue;
        }
        let suggestions = suggest_for(key, &table.column_names(), SUGGESTION_CUTOFF)
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|s| s.name)
            .collect();
        problems.push(KeyProblem {
            label: table.label.clone(),
            key: key.to_string(),
            suggestions,
        });
    }
    if problems.is_empty() {
        Ok(())
    } else {
        Err(MergeError::MissingKeyColumns { problems })
    }
}
