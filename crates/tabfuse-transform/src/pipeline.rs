//! Applying transformation specs, singly or as an ordered pipeline.

use tabfuse_model::{Diagnostic, DiagnosticList, Table, TransformSpec};

use crate::error::{Result, TransformError};
use crate::registry::{registry, validated};

/// A transformed table plus everything worth telling the user about.
#[derive(Debug)]
pub struct TransformOutcome {
    pub table: Table,
    pub diagnostics: DiagnosticList,
}

/// Apply a single transformation spec, propagating any failure.
pub fn apply_one(table: &Table, spec: &TransformSpec) -> Result<Table> {
    let transform =
        registry()
            .lookup(&spec.name)
            .ok_or_else(|| TransformError::UnknownTransform {
                name: spec.name.clone(),
            })?;
    let params = validated(transform, &spec.params, table)?;
    transform.apply(table, &params)
}

/// Apply a pipeline of specs in declared order.
///
/// A failing step is logged, recorded as a warning diagnostic, and
/// skipped; later steps run against the last good table.
pub fn apply_all(table: Table, specs: &[TransformSpec]) -> TransformOutcome {
    let mut diagnostics = DiagnosticList::new();
    let mut current = table;
    let mut applied = 0usize;

    for (index, spec) in specs.iter().enumerate() {
        match apply_one(&current, spec) {
            Ok(next) => {
                tracing::debug!(
                    step = index + 1,
                    transform = %spec.name,
                    rows = next.row_count(),
                    "transformation applied"
                );
                current = next;
                applied += 1;
            }
            Err(err) => {
                tracing::warn!(
                    step = index + 1,
                    transform = %spec.name,
                    error = %err,
                    "transformation skipped"
                );
                diagnostics.push(
                    Diagnostic::warning(format!(
                        "Step {} ('{}') skipped: {err}",
                        index + 1,
                        spec.name
                    ))
                    .with_source(current.label.clone()),
                );
            }
        }
    }

    if !specs.is_empty() {
        diagnostics.push(Diagnostic::info(format!(
            "Applied {applied} of {} transformations",
            specs.len()
        )));
    }

    TransformOutcome {
        table: current,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;
    use serde_json::json;
    use tabfuse_model::Severity;

    use super::*;

    fn sample() -> Table {
        Table::new(
            "t.csv",
            df!("name" => ["ada", "grace"], "score" => [10i64, 20]).unwrap(),
        )
    }

    fn spec(name: &str, params: serde_json::Value) -> TransformSpec {
        TransformSpec {
            name: name.to_string(),
            params: params.as_object().cloned().unwrap_or_default(),
        }
    }

    #[test]
    fn test_apply_one_unknown_transform() {
        let err = apply_one(&sample(), &spec("nope", json!({}))).unwrap_err();
        assert_eq!(err.to_string(), "unknown transformation: nope");
    }

    #[test]
    fn test_apply_one_reports_missing_parameter() {
        let err = apply_one(&sample(), &spec("text_case", json!({}))).unwrap_err();
        assert!(err.to_string().contains("is required"));
    }

    #[test]
    fn test_apply_one_transforms_table() {
        let out = apply_one(
            &sample(),
            &spec("text_case", json!({"column": "name", "case_type": "upper"})),
        )
        .unwrap();
        let v = out.data.column("name").unwrap().str().unwrap().get(0);
        assert_eq!(v, Some("ADA"));
    }

    #[test]
    fn test_apply_all_runs_in_declared_order() {
        let specs = vec![
            spec(
                "math_operation",
                json!({
                    "operation": "basic",
                    "column1": "score",
                    "operator": "*",
                    "use_value": true,
                    "value": 2,
                    "target_column": "score",
                }),
            ),
            spec(
                "filter_rows",
                json!({"column": "score", "filter_type": "greater_than", "value": "25"}),
            ),
        ];
        let outcome = apply_all(sample(), &specs);
        assert_eq!(outcome.table.row_count(), 1);
        assert!(!outcome.diagnostics.has_errors());
    }

    #[test]
    fn test_apply_all_skips_failing_step_and_continues() {
        let specs = vec![
            spec("text_case", json!({"column": "missing", "case_type": "upper"})),
            spec("drop_columns", json!({"columns": "score"})),
        ];
        let outcome = apply_all(sample(), &specs);
        assert_eq!(outcome.table.column_names(), vec!["name"]);
        assert_eq!(outcome.diagnostics.warning_count(), 1);
        let warning = outcome
            .diagnostics
            .iter()
            .find(|d| d.severity == Severity::Warning)
            .unwrap();
        assert!(warning.message.contains("'text_case'"));
    }

    #[test]
    fn test_apply_all_empty_pipeline_is_silent() {
        let outcome = apply_all(sample(), &[]);
        assert_eq!(outcome.table.row_count(), 2);
        assert!(outcome.diagnostics.is_empty());
    }
}
