use std::path::Path;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use reshape_cli::job::JobOutcome;
use reshape_model::{Table as DataTable, Value};

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// Prints the first `limit` rows of `data` followed by a row count line.
pub fn print_table_preview(data: &DataTable, limit: usize) {
    let mut table = Table::new();
    table.set_header(data.columns().iter().map(|name| header_cell(name.as_str())));
    apply_table_style(&mut table);
    for row in data.rows().iter().take(limit) {
        table.add_row(row.iter().map(value_cell));
    }
    for index in numeric_columns(data) {
        align_column(&mut table, index, CellAlignment::Right);
    }
    println!("{table}");
    if data.row_count() > limit {
        println!(
            "{} rows x {} columns ({} shown)",
            data.row_count(),
            data.column_count(),
            limit
        );
    } else {
        println!("{} rows x {} columns", data.row_count(), data.column_count());
    }
}

pub fn print_columns(columns: &[String]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Column")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, name) in columns.iter().enumerate() {
        table.add_row(vec![Cell::new(index + 1), Cell::new(name)]);
    }
    println!("{table}");
}

pub fn print_written(path: &Path, rows: usize) {
    println!("Wrote {rows} rows to {}", path.display());
}

pub fn print_job_outcome(outcome: &JobOutcome, preview_rows: usize) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Stage"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    table.add_row(vec![Cell::new("input"), Cell::new(outcome.input_rows)]);
    table.add_row(vec![
        Cell::new(format!("long ({} measures)", outcome.measure_fields.len())),
        Cell::new(outcome.long.row_count()),
    ]);
    if let Some(aggregated) = &outcome.aggregated {
        table.add_row(vec![Cell::new("aggregate"), Cell::new(aggregated.row_count())]);
    }
    if let Some(chart) = &outcome.chart {
        table.add_row(vec![Cell::new("chart"), Cell::new(chart.row_count())]);
    }
    table.add_row(vec![Cell::new("round trip"), round_trip_cell(outcome.round_trip)]);
    println!("{table}");

    if outcome.written.is_empty() {
        let preview = outcome
            .chart
            .as_ref()
            .or(outcome.aggregated.as_ref())
            .unwrap_or(&outcome.long);
        print_table_preview(preview, preview_rows);
    }
    for path in &outcome.written {
        println!("Output: {}", path.display());
    }
}

/// Columns whose first non-null value is numeric.
fn numeric_columns(data: &DataTable) -> Vec<usize> {
    (0..data.column_count())
        .filter(|&index| {
            data.rows()
                .iter()
                .map(|row| &row[index])
                .find(|value| !value.is_null())
                .is_some_and(Value::is_numeric)
        })
        .collect()
}

fn round_trip_cell(round_trip: Option<bool>) -> Cell {
    match round_trip {
        Some(true) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        Some(false) => Cell::new("✗")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn value_cell(value: &Value) -> Cell {
    match value {
        Value::Null => dim_cell("null"),
        other => Cell::new(other),
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
