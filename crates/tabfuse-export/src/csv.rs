//! CSV rendering.

use ::csv::WriterBuilder;
use polars::prelude::AnyValue;

use tabfuse_model::Table;
use tabfuse_model::value::any_to_string;

use crate::error::{ExportError, Result};

/// Render a table as CSV bytes: header row first, rows in order, no
/// index column. Missing cells come out empty.
pub fn write_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer.write_record(table.column_names())?;

    let columns = table.data.get_columns();
    for row in 0..table.row_count() {
        let record: Vec<String> = columns
            .iter()
            .map(|column| any_to_string(column.get(row).unwrap_or(AnyValue::Null)))
            .collect();
        writer.write_record(&record)?;
    }

    writer.into_inner().map_err(|e| ExportError::Csv {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use polars::prelude::*;

    use super::*;

    #[test]
    fn test_missing_cells_render_empty() {
        let table = Table::new(
            "t.csv",
            df!("a" => [Some(1i64), None], "b" => ["x", "y"]).unwrap(),
        );
        let bytes = write_csv(&table).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "a,b\n1,x\n,y\n");
    }

    #[test]
    fn test_commas_and_quotes_are_escaped() {
        let table = Table::new(
            "t.csv",
            df!("note" => ["plain", "a,b", "say \"hi\""]).unwrap(),
        );
        let bytes = write_csv(&table).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "note\nplain\n\"a,b\"\n\"say \"\"hi\"\"\"\n"
        );
    }
}
