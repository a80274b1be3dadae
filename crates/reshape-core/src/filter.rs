use tracing::debug;

use reshape_model::{Result, Table};

/// Keeps the rows whose `field` is non-null.
///
/// The pivots never drop null values themselves; callers that want a dense
/// long table filter it here.
pub fn drop_nulls(table: &Table, field: &str) -> Result<Table> {
    let column = table.require_column(field)?;
    let rows = table
        .rows()
        .iter()
        .filter(|row| !row[column].is_null())
        .cloned();
    let output = Table::from_rows(table.columns().iter().cloned(), rows)?;
    debug!(
        field,
        dropped = table.row_count() - output.row_count(),
        "dropped null rows"
    );
    Ok(output)
}
