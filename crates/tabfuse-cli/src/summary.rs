//! Console rendering for command results.

use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ContentArrangement, Table,
    modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS},
};

use tabfuse_model::{DiagnosticList, Severity};

use crate::commands::{MergeReport, TransformReport};

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::DarkGrey)
}

fn count_cell(value: usize, color: Color) -> Cell {
    if value > 0 {
        Cell::new(value).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell("0")
    }
}

/// Shared style for data listings.
pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// Denser bordered style for small key/value summaries.
fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS);
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

pub fn print_merge_report(report: &MergeReport) {
    let mut table = Table::new();
    apply_summary_table_style(&mut table);
    table.set_header(vec![header_cell("Merge"), header_cell("Result")]);
    table.add_row(vec![Cell::new("Files loaded"), Cell::new(report.loaded)]);
    table.add_row(vec![Cell::new("Rows"), Cell::new(report.rows)]);
    table.add_row(vec![Cell::new("Columns"), Cell::new(report.columns)]);
    table.add_row(vec![
        Cell::new("Warnings"),
        count_cell(report.diagnostics.warning_count(), Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Errors"),
        count_cell(report.diagnostics.error_count(), Color::Red),
    ]);
    println!("{table}");

    for path in &report.written {
        println!("Wrote {}", path.display());
    }

    print_diagnostics(&report.diagnostics);
}

pub fn print_transform_report(report: &TransformReport) {
    let mut table = Table::new();
    apply_summary_table_style(&mut table);
    table.set_header(vec![header_cell("Transform"), header_cell("Result")]);
    table.add_row(vec![Cell::new("Steps"), Cell::new(report.steps)]);
    table.add_row(vec![Cell::new("Rows"), Cell::new(report.rows)]);
    table.add_row(vec![Cell::new("Columns"), Cell::new(report.columns)]);
    table.add_row(vec![
        Cell::new("Warnings"),
        count_cell(report.diagnostics.warning_count(), Color::Yellow),
    ]);
    println!("{table}");

    if let Some(path) = &report.written {
        println!("Wrote {}", path.display());
    }

    print_diagnostics(&report.diagnostics);
}

/// Render accumulated diagnostics in arrival order.
pub fn print_diagnostics(diagnostics: &DiagnosticList) {
    if diagnostics.is_empty() {
        return;
    }

    let mut table = Table::new();
    apply_table_style(&mut table);
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Source"),
        header_cell("Message"),
    ]);
    for diagnostic in diagnostics.iter() {
        table.add_row(vec![
            severity_cell(diagnostic.severity),
            match &diagnostic.source {
                Some(source) => Cell::new(source),
                None => dim_cell("-"),
            },
            Cell::new(&diagnostic.message),
        ]);
    }
    println!("{table}");
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("error")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("warning").fg(Color::Yellow),
        Severity::Info => dim_cell("info"),
    }
}
