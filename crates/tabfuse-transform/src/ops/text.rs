//! Case conversion and regex-based text transformations.

use polars::prelude::*;
use regex::{Regex, RegexBuilder};
use serde_json::json;

use tabfuse_model::Table;

use crate::data_utils::{require_column, string_values, target_name, with_series};
use crate::error::{Result, TransformError};
use crate::param::{ParamKind, ParamSpec, Params};
use crate::registry::Transform;

const CASE_TYPES: &[&str] = &["lower", "upper", "title", "sentence"];

/// Change the case of a text column in place. Missing cells stay missing.
pub struct TextCase;

impl Transform for TextCase {
    fn name(&self) -> &'static str {
        "text_case"
    }

    fn description(&self) -> &'static str {
        "Change the case of text data in a column (uppercase, lowercase, title case)"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("column", "Column", ParamKind::Column),
            ParamSpec::required("case_type", "Case Type", ParamKind::Select)
                .with_options(CASE_TYPES)
                .with_default(json!("lower")),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let column = params.required_str("column", "Column")?;
        let case_type = params.required_str("case_type", "Case Type")?;

        let convert: fn(&str) -> String = match case_type {
            "lower" => str::to_lowercase,
            "upper" => str::to_uppercase,
            "title" => title_case,
            _ => sentence_case,
        };

        let values: Vec<Option<String>> =
            string_values(require_column(&table.data, column)?)
                .iter()
                .map(|cell| cell.as_deref().map(convert))
                .collect();

        with_series(table, Series::new(column.into(), values))
    }
}

/// Uppercase every letter that follows a non-letter, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut boundary = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if boundary {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(ch);
            boundary = true;
        }
    }
    out
}

/// Lowercase everything, then capitalize the first character.
fn sentence_case(text: &str) -> String {
    let lower = text.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => lower,
    }
}

fn compile(pattern: &str, case_sensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| TransformError::invalid(format!("Invalid regular expression: {e}")))
}

/// Copy the first regex match from a source column into a target column.
pub struct PatternExtract;

impl Transform for PatternExtract {
    fn name(&self) -> &'static str {
        "pattern_extract"
    }

    fn description(&self) -> &'static str {
        "Extract text that matches a pattern and save to a new column"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("source_column", "Source Column", ParamKind::Column),
            ParamSpec::required("target_column", "Target Column Name", ParamKind::Text),
            ParamSpec::required("pattern", "Regular Expression Pattern", ParamKind::Text)
                .with_default(json!("(\\d+)")),
            ParamSpec::optional("replace_na", "Replacement for Non-Matches", ParamKind::Text)
                .with_default(json!("")),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let source = params.required_str("source_column", "Source Column")?;
        let target = target_name(params.str("target_column"))?;
        let pattern = params.required_str("pattern", "Regular Expression Pattern")?;
        let fallback = params.str("replace_na").unwrap_or("");

        let regex = compile(pattern, true)?;

        let values: Vec<String> = string_values(require_column(&table.data, source)?)
            .iter()
            .map(|cell| match cell {
                Some(text) => match regex.find(text) {
                    Some(found) => found.as_str().to_string(),
                    None => fallback.to_string(),
                },
                None => fallback.to_string(),
            })
            .collect();

        with_series(table, Series::new(target.as_str().into(), values))
    }
}

/// Regex find-and-replace over a text column, in place.
pub struct PatternReplace;

impl Transform for PatternReplace {
    fn name(&self) -> &'static str {
        "pattern_replace"
    }

    fn description(&self) -> &'static str {
        "Replace text patterns in a column using regular expressions"
    }

    fn parameters(&self) -> Vec<ParamSpec> {
        vec![
            ParamSpec::required("column", "Column", ParamKind::Column),
            ParamSpec::required("pattern", "Search Pattern", ParamKind::Text),
            ParamSpec::required("replacement", "Replacement Text", ParamKind::Text)
                .with_default(json!("")),
            ParamSpec::optional("case_sensitive", "Case Sensitive", ParamKind::Bool)
                .with_default(json!(true)),
        ]
    }

    fn apply(&self, table: &Table, params: &Params) -> Result<Table> {
        let column = params.required_str("column", "Column")?;
        let pattern = params.required_str("pattern", "Search Pattern")?;
        let replacement = params.str("replacement").unwrap_or("");
        let case_sensitive = params.bool_or("case_sensitive", true);

        let regex = compile(pattern, case_sensitive)?;

        let values: Vec<Option<String>> = string_values(require_column(&table.data, column)?)
            .iter()
            .map(|cell| {
                cell.as_deref()
                    .map(|text| regex.replace_all(text, replacement).into_owned())
            })
            .collect();

        with_series(table, Series::new(column.into(), values))
    }
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

    fn column_strings(table: &Table, name: &str) -> Vec<String> {
        let series = table.data.column(name).unwrap().as_materialized_series();
        (0..series.len())
            .map(|i| any_to_string(series.get(i).unwrap()))
            .collect()
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(title_case("hello world"), "Hello World");
        assert_eq!(title_case("o'brien-smith"), "O'Brien-Smith");
        assert_eq!(sentence_case("HELLO WORLD. BYE"), "Hello world. bye");
        assert_eq!(sentence_case(""), "");
    }

    #[test]
    fn test_text_case_in_place_keeps_nulls() {
        let t = table(df!("name" => [Some("alice smith"), None, Some("BOB")]).unwrap());
        let params = validated(
            &TextCase,
            json!({"column": "name", "case_type": "title"}),
            &t,
        );
        let out = TextCase.apply(&t, &params).unwrap();
        assert_eq!(out.column_count(), 1);
        assert_eq!(column_strings(&out, "name"), vec!["Alice Smith", "", "Bob"]);
        assert_eq!(out.data.column("name").unwrap().null_count(), 1);
    }

    #[test]
    fn test_pattern_extract_first_match() {
        let t = table(df!("code" => ["order 123 of 456", "no digits", "789"]).unwrap());
        let params = validated(
            &PatternExtract,
            json!({
                "source_column": "code",
                "target_column": "number",
                "replace_na": "none"
            }),
            &t,
        );
        let out = PatternExtract.apply(&t, &params).unwrap();
        assert_eq!(column_strings(&out, "number"), vec!["123", "none", "789"]);
    }

    #[test]
    fn test_pattern_extract_rejects_bad_regex() {
        let t = table(df!("code" => ["x"]).unwrap());
        let params = validated(
            &PatternExtract,
            json!({"source_column": "code", "target_column": "out", "pattern": "(unclosed"}),
            &t,
        );
        let err = PatternExtract.apply(&t, &params).unwrap_err();
        assert!(err.to_string().starts_with("Invalid regular expression:"));
    }

    #[test]
    fn test_pattern_replace_case_insensitive() {
        let t = table(df!("note" => ["Error: disk", "ERROR again", "fine"]).unwrap());
        let params = validated(
            &PatternReplace,
            json!({
                "column": "note",
                "pattern": "error",
                "replacement": "warn",
                "case_sensitive": false
            }),
            &t,
        );
        let out = PatternReplace.apply(&t, &params).unwrap();
        assert_eq!(
            column_strings(&out, "note"),
            vec!["warn: disk", "warn again", "fine"]
        );
    }

    #[test]
    fn test_pattern_replace_all_occurrences() {
        let t = table(df!("v" => ["a-b-c"]).unwrap());
        let params = validated(
            &PatternReplace,
            json!({"column": "v", "pattern": "-", "replacement": "_"}),
            &t,
        );
        let out = PatternReplace.apply(&t, &params).unwrap();
        assert_eq!(column_strings(&out, "v"), vec!["a_b_c"]);
    }
}
