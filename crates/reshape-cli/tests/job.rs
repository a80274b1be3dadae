use std::fs;
use std::path::Path;

use reshape_cli::job::{JobConfig, load_job, run_job};
use reshape_ingest::to_csv_string;
use reshape_model::Value;

const UNITS_CSV: &str = "\
borough,ucbbl,uc2007,uc2008
MN,1001,10,
BK,3002,5,20
MN,1002,7,8
";

const JOB_JSON: &str = r#"{
  "input": "units.csv",
  "identifier_fields": ["borough", "ucbbl"],
  "measure_prefix": "uc",
  "category_prefix": "uc",
  "category_field": "year",
  "value_field": "units",
  "drop_nulls": true,
  "verify_round_trip": true,
  "long_output": "out/long.csv",
  "aggregate": {
    "group_by": ["year", "borough"],
    "aggregations": [{ "output": "units", "source": "units", "reducer": "sum" }],
    "output": "out/totals.csv"
  },
  "chart": {
    "category": "year",
    "series": "borough",
    "value": "units",
    "output": "out/chart.csv"
  }
}"#;

fn write_fixture(dir: &Path) -> JobConfig {
    fs::write(dir.join("units.csv"), UNITS_CSV).expect("write csv");
    let job_path = dir.join("job.json");
    fs::write(&job_path, JOB_JSON).expect("write job");
    load_job(&job_path).expect("load job")
}

#[test]
fn job_runs_long_aggregate_and_chart_steps() {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = write_fixture(dir.path());
    let outcome = run_job(&config, dir.path()).expect("run job");

    assert_eq!(outcome.input_rows, 3);
    assert_eq!(outcome.measure_fields, vec!["uc2007", "uc2008"]);
    assert_eq!(outcome.round_trip, Some(true));
    assert_eq!(outcome.written.len(), 3);

    let long_csv = fs::read_to_string(dir.path().join("out/long.csv")).expect("long csv");
    insta::assert_snapshot!(long_csv, @r"
    borough,ucbbl,year,units
    MN,1001,2007,10
    BK,3002,2007,5
    BK,3002,2008,20
    MN,1002,2007,7
    MN,1002,2008,8
    ");

    let aggregated = outcome.aggregated.expect("aggregate table");
    insta::assert_snapshot!(to_csv_string(&aggregated).expect("csv"), @r"
    year,borough,units
    2007,MN,17
    2007,BK,5
    2008,BK,20
    2008,MN,8
    ");

    let chart = outcome.chart.expect("chart table");
    assert_eq!(chart.columns(), ["year", "MN", "BK"]);
    assert_eq!(chart.value(1, "BK"), Some(&Value::Integer(20)));
    let chart_csv = fs::read_to_string(dir.path().join("out/chart.csv")).expect("chart csv");
    assert!(chart_csv.starts_with("year,MN,BK"));
}

#[test]
fn explicit_measures_keep_null_values() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = write_fixture(dir.path());
    config.measure_prefix = None;
    config.measure_fields = Some(vec!["uc2008".to_string()]);
    config.drop_nulls = false;
    config.long_output = None;
    config.aggregate = None;
    config.chart = None;

    let outcome = run_job(&config, dir.path()).expect("run job");
    assert_eq!(outcome.long.row_count(), 3);
    assert_eq!(outcome.long.value(0, "units"), Some(&Value::Null));
    assert_eq!(outcome.round_trip, Some(true));
    assert!(outcome.written.is_empty());
}

#[test]
fn duplicate_identifiers_fail_the_round_trip_check() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = write_fixture(dir.path());
    config.identifier_fields = vec!["borough".to_string()];
    config.long_output = None;
    config.aggregate = None;
    config.chart = None;

    let outcome = run_job(&config, dir.path()).expect("run job");
    assert_eq!(outcome.round_trip, Some(false));
}

#[test]
fn chart_without_aggregate_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = write_fixture(dir.path());
    config.aggregate = None;
    config.long_output = None;

    let err = run_job(&config, dir.path()).unwrap_err();
    assert!(err.to_string().contains("requires an aggregate step"));
}

#[test]
fn missing_identifier_surfaces_schema_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut config = write_fixture(dir.path());
    config.identifier_fields = vec!["precinct".to_string()];

    let err = run_job(&config, dir.path()).unwrap_err();
    assert!(format!("{err:#}").contains("precinct"));
}
