use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use reshape_model::{Table, Value};

/// Options controlling how delimited text becomes a [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Infer integer and float cells; when off every non-empty cell is text.
    pub infer_types: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            infer_types: true,
        }
    }
}

impl IngestOptions {
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_infer_types(mut self, enable: bool) -> Self {
        self.infer_types = enable;
        self
    }
}

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_cell(raw: &str, options: &IngestOptions) -> Value {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if options.infer_types {
        Value::infer(trimmed)
    } else if trimmed.is_empty() {
        Value::Null
    } else {
        Value::Text(trimmed.to_string())
    }
}

pub fn read_csv_table(path: &Path) -> Result<Table> {
    read_csv_table_with_options(path, &IngestOptions::default())
}

pub fn read_csv_table_with_options(path: &Path, options: &IngestOptions) -> Result<Table> {
    let file = std::fs::File::open(path).with_context(|| format!("open csv: {}", path.display()))?;
    let table =
        read_csv_reader(file, options).with_context(|| format!("read csv: {}", path.display()))?;
    debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "loaded csv table"
    );
    Ok(table)
}

/// Reads a header row followed by data rows.
///
/// Rows whose cells are all blank are skipped. Short rows are padded with
/// nulls and long rows truncated to the header width.
pub fn read_csv_reader<R: Read>(reader: R, options: &IngestOptions) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(reader);
    let mut records = reader.records();
    let headers: Vec<String> = loop {
        match records.next() {
            Some(record) => {
                let record = record.context("read header")?;
                if is_blank(&record) {
                    continue;
                }
                break record.iter().map(normalize_header).collect();
            }
            None => return Ok(Table::new(Vec::<String>::new())?),
        }
    };
    let width = headers.len();
    let mut table = Table::new(headers).context("csv header")?;
    let mut ragged = 0usize;
    for (line, record) in records.enumerate() {
        let record = record.with_context(|| format!("read record {}", line + 1))?;
        if is_blank(&record) {
            continue;
        }
        if record.len() != width {
            ragged += 1;
        }
        let row: Vec<Value> = (0..width)
            .map(|idx| record.get(idx).map_or(Value::Null, |raw| parse_cell(raw, options)))
            .collect();
        table.push_row(row)?;
    }
    if ragged > 0 {
        warn!(rows = ragged, width, "rows did not match the header width");
    }
    Ok(table)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|value| value.trim().is_empty())
}
