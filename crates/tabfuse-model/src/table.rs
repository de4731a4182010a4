//! Table wrapper carrying a polars frame and its source label.

use polars::prelude::DataFrame;

/// In-memory columnar dataset.
///
/// All columns share one row count for the table's lifetime. The label
/// identifies the originating file and travels with the data so diagnostics
/// can name their source.
#[derive(Debug, Clone)]
pub struct Table {
    /// Source label, usually the input file name.
    pub label: String,
    /// Backing frame.
    pub data: DataFrame,
}

impl Table {
    pub fn new(label: impl Into<String>, data: DataFrame) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.data.height()
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.data.width()
    }

    /// Column names in declaration order.
    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names_owned()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.data.column(name).is_ok()
    }

    /// Replace the backing frame, keeping the label.
    pub fn with_data(mut self, data: DataFrame) -> Self {
        self.data = data;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn shape_and_names() {
        let df = DataFrame::new(vec![
            Series::new("id".into(), vec![1i64, 2, 3]).into(),
            Series::new("name".into(), vec!["a", "b", "c"]).into(),
        ])
        .unwrap();
        let table = Table::new("people.csv", df);

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.column_names(), vec!["id", "name"]);
        assert!(table.has_column("id"));
        assert!(!table.has_column("age"));
        assert_eq!(table.label, "people.csv");
    }
}
