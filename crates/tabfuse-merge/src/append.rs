//! Row-wise appending over the union of all columns.

use polars::prelude::*;

use tabfuse_model::{Table, is_numeric_dtype};

use crate::error::Result;

/// Stack tables on top of each other.
///
/// The output schema is the union of all column names in first-seen
/// order. Columns a table lacks are filled with missing values, and
/// columns whose types disagree are unified first: matching numeric
/// types widen to floats, anything else falls back to text.
pub fn append_tables(tables: &[Table]) -> Result<DataFrame> {
    let mut names: Vec<String> = Vec::new();
    let mut dtypes: Vec<DataType> = Vec::new();

    for table in tables {
        for column in table.data.get_columns() {
            let name = column.name().to_string();
            match names.iter().position(|n| *n == name) {
                Some(idx) => dtypes[idx] = unify_dtypes(&dtypes[idx], column.dtype()),
                None => {
                    names.push(name);
                    dtypes.push(column.dtype().clone());
                }
            }
        }
    }

    let mut out: Option<DataFrame> = None;
    for table in tables {
        let height = table.row_count();
        let mut columns: Vec<Column> = Vec::with_capacity(names.len());
        for (name, dtype) in names.iter().zip(&dtypes) {
            let series = match table.data.column(name) {
                Ok(column) => column.as_materialized_series().cast(dtype)?,
                Err(_) => Series::full_null(name.as_str().into(), height, dtype),
            };
            columns.push(series.into());
        }
        let aligned = DataFrame::new(columns)?;
        match out.as_mut() {
            Some(acc) => {
                acc.vstack_mut(&aligned)?;
            }
            None => out = Some(aligned),
        }
    }

    // Empty input is rejected by the engine before dispatch.
    Ok(out.unwrap_or_else(DataFrame::empty))
}

/// Narrowest shared type for two column dtypes.
pub(crate) fn unify_dtypes(a: &DataType, b: &DataType) -> DataType {
    if a == b {
        return a.clone();
    }
    if matches!(a, DataType::Null) {
        return b.clone();
    }
    if matches!(b, DataType::Null) {
        return a.clone();
    }
    if is_numeric_dtype(a) && is_numeric_dtype(b) {
        return DataType::Float64;
    }
    DataType::String
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(label: &str, columns: Vec<Column>) -> Table {
        Table::new(label, DataFrame::new(columns).unwrap())
    }

    #[test]
    fn test_row_counts_sum_and_columns_union() {
        let a = table(
            "a.csv",
            vec![
                Series::new("id".into(), vec![1i64, 2]).into(),
                Series::new("name".into(), vec!["x", "y"]).into(),
            ],
        );
        let b = table(
            "b.csv",
            vec![
                Series::new("id".into(), vec![3i64, 4, 5]).into(),
                Series::new("score".into(), vec![0.5f64, 0.6, 0.7]).into(),
            ],
        );

        let df = append_tables(&[a, b]).unwrap();
        assert_eq!(df.height(), 5);
        let names: Vec<String> = df.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["id", "name", "score"]);
        assert_eq!(df.column("name").unwrap().null_count(), 3);
        assert_eq!(df.column("score").unwrap().null_count(), 2);
    }

    #[test]
    fn test_int_and_float_columns_widen() {
        let a = table("a.csv", vec![Series::new("x".into(), vec![1i64, 2]).into()]);
        let b = table(
            "b.csv",
            vec![Series::new("x".into(), vec![1.5f64, 2.5]).into()],
        );

        let df = append_tables(&[a, b]).unwrap();
        assert_eq!(df.column("x").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("x").unwrap().f64().unwrap().get(0), Some(1.0));
    }

    #[test]
    fn test_conflicting_types_fall_back_to_text() {
        let a = table("a.csv", vec![Series::new("x".into(), vec![1i64, 2]).into()]);
        let b = table(
            "b.csv",
            vec![Series::new("x".into(), vec!["one", "two"]).into()],
        );

        let df = append_tables(&[a, b]).unwrap();
        assert_eq!(df.column("x").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_single_table_passes_through() {
        let a = table(
            "a.csv",
            vec![Series::new("id".into(), vec![1i64, 2, 3]).into()],
        );
        let df = append_tables(&[a]).unwrap();
        assert_eq!(df.shape(), (3, 1));
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
    }
}
