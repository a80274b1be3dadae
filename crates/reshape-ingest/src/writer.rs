use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use csv::WriterBuilder;
use tracing::debug;

use reshape_model::Table;

/// Writes `table` as CSV with a header row; nulls become empty cells.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer
        .write_record(table.columns())
        .context("write csv header")?;
    for (idx, row) in table.rows().iter().enumerate() {
        writer
            .write_record(row.iter().map(ToString::to_string))
            .with_context(|| format!("write csv row {idx}"))?;
    }
    writer.flush().context("flush csv")?;
    Ok(())
}

pub fn write_csv_table(table: &Table, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir: {}", parent.display()))?;
    }
    let file = std::fs::File::create(path)
        .with_context(|| format!("create csv: {}", path.display()))?;
    write_csv(table, file).with_context(|| format!("write csv: {}", path.display()))?;
    debug!(path = %path.display(), rows = table.row_count(), "wrote csv table");
    Ok(())
}

/// Renders `table` as a CSV string.
pub fn to_csv_string(table: &Table) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    String::from_utf8(buffer).context("csv output is not utf-8")
}
