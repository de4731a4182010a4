//! Styled xlsx rendering through rust_xlsxwriter.

use polars::prelude::AnyValue;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

use tabfuse_model::Table;
use tabfuse_model::value::{any_to_f64, any_to_string, is_numeric_dtype};

use crate::error::Result;

/// Fill behind the header row.
const HEADER_FILL: Color = Color::RGB(0x00D9_E1F2);

/// Padding added to the widest cell when sizing a column.
const WIDTH_PADDING: usize = 2;

/// Render a table as a single-sheet workbook named "Data".
///
/// The header row is bold on a light fill with a thin border, and each
/// column is sized to its longest stringified value.
pub fn write_xlsx(table: &Table) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Data")?;

    let header_format = Format::new()
        .set_bold()
        .set_background_color(HEADER_FILL)
        .set_border(FormatBorder::Thin);

    let names = table.column_names();
    for (col, column) in table.data.get_columns().iter().enumerate() {
        let col_idx = col as u16;
        let name = &names[col];
        sheet.write_string_with_format(0, col_idx, name.as_str(), &header_format)?;

        let numeric = is_numeric_dtype(column.dtype());
        let mut width = name.chars().count();
        for row in 0..table.row_count() {
            let value = column.get(row).unwrap_or(AnyValue::Null);
            let text = any_to_string(value.clone());
            width = width.max(text.chars().count());

            let row_idx = row as u32 + 1;
            match value {
                AnyValue::Null => {}
                AnyValue::Boolean(b) => {
                    sheet.write_boolean(row_idx, col_idx, b)?;
                }
                ref v if numeric => {
                    if let Some(n) = any_to_f64(v) {
                        sheet.write_number(row_idx, col_idx, n)?;
                    }
                }
                _ => {
                    sheet.write_string(row_idx, col_idx, text)?;
                }
            }
        }
        sheet.set_column_width(col_idx, (width + WIDTH_PADDING) as f64)?;
    }

    Ok(workbook.save_to_buffer()?)
}
