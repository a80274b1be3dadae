use std::fs;

use reshape_ingest::{
    IngestOptions, read_csv_reader, read_csv_table, read_csv_table_with_options, to_csv_string,
    write_csv_table,
};
use reshape_model::Value;

#[test]
fn reads_table_and_infers_cell_types() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("units.csv");
    fs::write(
        &path,
        "borough,ucbbl,uc2007,uc2008,abatement\nMN,1001,10,,Y\n,,,,\nBK,3002,5,20.5,N\n",
    )
    .expect("write csv");

    let table = read_csv_table(&path).expect("read csv");
    assert_eq!(
        table.columns(),
        ["borough", "ucbbl", "uc2007", "uc2008", "abatement"]
    );
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.value(0, "uc2008"), Some(&Value::Null));
    assert_eq!(table.value(0, "uc2007"), Some(&Value::Integer(10)));
    assert_eq!(table.value(1, "uc2008"), Some(&Value::Float(20.5)));
    assert_eq!(table.value(1, "borough"), Some(&Value::from("BK")));
}

#[test]
fn pads_short_rows_and_truncates_long_rows() {
    let csv = "id,a,b\nx,1\ny,2,3,4\n";
    let table = read_csv_reader(csv.as_bytes(), &IngestOptions::default()).expect("read csv");
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.value(0, "b"), Some(&Value::Null));
    assert_eq!(table.value(1, "b"), Some(&Value::Integer(3)));
}

#[test]
fn reads_tab_delimited_text_without_inference() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("units.tsv");
    fs::write(&path, "id\tuc2007\n007\t10\n").expect("write tsv");
    let options = IngestOptions::default()
        .with_delimiter(b'\t')
        .with_infer_types(false);
    let table = read_csv_table_with_options(&path, &options).expect("read tsv");
    assert_eq!(table.value(0, "id"), Some(&Value::from("007")));
    assert_eq!(table.value(0, "uc2007"), Some(&Value::from("10")));
}

#[test]
fn empty_input_is_an_empty_table() {
    let table = read_csv_reader("\n\n".as_bytes(), &IngestOptions::default()).expect("read csv");
    assert_eq!(table.column_count(), 0);
    assert!(table.is_empty());
}

#[test]
fn duplicate_headers_are_rejected() {
    let err = read_csv_reader("a,a\n1,2\n".as_bytes(), &IngestOptions::default()).unwrap_err();
    assert!(format!("{err:#}").contains("duplicate column name: a"));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.csv");
    let err = read_csv_table(&path).unwrap_err();
    assert!(err.to_string().contains("absent.csv"));
}

#[test]
fn written_csv_reads_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let source = read_csv_reader(
        "id,year,units\nA,2007,10\nA,2008,\n".as_bytes(),
        &IngestOptions::default(),
    )
    .expect("read csv");
    assert_eq!(
        to_csv_string(&source).expect("render"),
        "id,year,units\nA,2007,10\nA,2008,\n"
    );

    let path = dir.path().join("out").join("long.csv");
    write_csv_table(&source, &path).expect("write csv");
    let reread = read_csv_table(&path).expect("read back");
    assert_eq!(reread, source);
}
