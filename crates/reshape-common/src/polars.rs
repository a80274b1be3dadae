//! Conversions between [`Table`] and Polars `DataFrame`.
//!
//! Each table column becomes one series. A column whose non-null values are
//! all integers becomes `Int64`, all numeric becomes `Float64`, anything else
//! becomes `String` using the canonical cell text.

use std::fs::File;
use std::path::Path;

use polars::prelude::{
    AnyValue, Column, CsvWriter, DataFrame, IntoColumn, NamedFrom, PolarsError, PolarsResult,
    SerWriter, Series,
};

use reshape_model::{Table, Value};

/// Converts a Polars `AnyValue` into a cell value.
///
/// Integer widths collapse to `Integer`, floats to `Float`, booleans to `Y`/`N`
/// text, and anything else to its display text.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use reshape_common::any_to_value;
/// use reshape_model::Value;
///
/// assert_eq!(any_to_value(AnyValue::Null), Value::Null);
/// assert_eq!(any_to_value(AnyValue::Int32(42)), Value::Integer(42));
/// assert_eq!(any_to_value(AnyValue::String("MN")), Value::from("MN"));
/// ```
pub fn any_to_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Int8(v) => Value::Integer(i64::from(v)),
        AnyValue::Int16(v) => Value::Integer(i64::from(v)),
        AnyValue::Int32(v) => Value::Integer(i64::from(v)),
        AnyValue::Int64(v) => Value::Integer(v),
        AnyValue::UInt8(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt16(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt32(v) => Value::Integer(i64::from(v)),
        AnyValue::UInt64(v) => match i64::try_from(v) {
            Ok(v) => Value::Integer(v),
            Err(_) => Value::Float(v as f64),
        },
        AnyValue::Float32(v) => Value::Float(f64::from(v)),
        AnyValue::Float64(v) => Value::Float(v),
        AnyValue::String(s) => Value::Text(s.to_string()),
        AnyValue::StringOwned(s) => Value::Text(s.to_string()),
        AnyValue::Boolean(b) => Value::Text(if b { "Y" } else { "N" }.to_string()),
        other => Value::Text(other.to_string()),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Integer,
    Float,
    Text,
}

fn column_kind<'a>(values: impl Iterator<Item = &'a Value>) -> ColumnKind {
    let mut kind = ColumnKind::Integer;
    for value in values {
        match value {
            Value::Null | Value::Integer(_) => {}
            Value::Float(_) => kind = ColumnKind::Float,
            Value::Text(_) => return ColumnKind::Text,
        }
    }
    kind
}

/// Builds a `DataFrame` with one series per table column.
pub fn table_to_dataframe(table: &Table) -> PolarsResult<DataFrame> {
    let columns: Vec<Column> = table
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let cells = table.rows().iter().map(|row| &row[idx]);
            let series = match column_kind(cells.clone()) {
                ColumnKind::Integer => {
                    let values: Vec<Option<i64>> = cells
                        .map(|value| match value {
                            Value::Integer(v) => Some(*v),
                            _ => None,
                        })
                        .collect();
                    Series::new(name.as_str().into(), values)
                }
                ColumnKind::Float => {
                    let values: Vec<Option<f64>> = cells.map(Value::as_f64).collect();
                    Series::new(name.as_str().into(), values)
                }
                ColumnKind::Text => {
                    let values: Vec<Option<String>> = cells
                        .map(|value| (!value.is_null()).then(|| value.to_string()))
                        .collect();
                    Series::new(name.as_str().into(), values)
                }
            };
            series.into_column()
        })
        .collect();
    DataFrame::new(columns)
}

/// Reads a `DataFrame` back into a table, row by row.
pub fn dataframe_to_table(df: &DataFrame) -> PolarsResult<Table> {
    let names: Vec<String> = df
        .get_columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();
    let mut table = Table::new(names).map_err(to_polars_error)?;
    for row_idx in 0..df.height() {
        let row = df
            .get_columns()
            .iter()
            .map(|column| column.get(row_idx).map(any_to_value))
            .collect::<PolarsResult<Vec<Value>>>()?;
        table.push_row(row).map_err(to_polars_error)?;
    }
    Ok(table)
}

/// Writes a frame as CSV with a header row.
pub fn write_frame_csv(df: &mut DataFrame, path: &Path) -> PolarsResult<()> {
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).include_header(true).finish(df)
}

fn to_polars_error(error: reshape_model::ReshapeError) -> PolarsError {
    PolarsError::ComputeError(error.to_string().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::DataType;

    fn long_table() -> Table {
        let rows: Vec<Vec<Value>> = vec![
            vec!["MN".into(), 2007.into(), 10.into(), 1.5.into()],
            vec!["BK".into(), 2008.into(), Value::Null, 2.into()],
        ];
        Table::from_rows(["borough", "year", "units", "ratio"], rows).expect("table")
    }

    #[test]
    fn infers_series_types() {
        let df = table_to_dataframe(&long_table()).expect("dataframe");
        assert_eq!(df.height(), 2);
        assert_eq!(df.column("borough").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("year").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("units").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("ratio").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("units").unwrap().null_count(), 1);
    }

    #[test]
    fn dataframe_round_trips_values() {
        let table = long_table();
        let df = table_to_dataframe(&table).expect("dataframe");
        let back = dataframe_to_table(&df).expect("table");
        assert_eq!(back.columns(), table.columns());
        assert_eq!(back.value(0, "borough"), Some(&Value::from("MN")));
        assert_eq!(back.value(1, "units"), Some(&Value::Null));
        assert_eq!(back.value(1, "ratio"), Some(&Value::Float(2.0)));
    }

    #[test]
    fn writes_frame_as_csv() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("chart.csv");
        let mut df = table_to_dataframe(&long_table()).expect("dataframe");
        write_frame_csv(&mut df, &path).expect("write frame");
        let text = std::fs::read_to_string(&path).expect("read frame");
        assert!(text.starts_with("borough,year,units,ratio\n"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn empty_table_becomes_empty_frame() {
        let table = Table::new(["borough", "units"]).expect("table");
        let df = table_to_dataframe(&table).expect("dataframe");
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 2);
    }
}
