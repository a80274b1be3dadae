//! Pipeline jobs described by a JSON file.
//!
//! A job loads one wide CSV table, pivots it to long form, optionally
//! aggregates the long table, and optionally spreads the aggregate into a
//! chart-ready frame (one row per category, one column per series).
//!
//! ```json
//! {
//!   "input": "rentstab.csv",
//!   "identifier_fields": ["borough", "ucbbl"],
//!   "measure_prefix": "uc",
//!   "category_prefix": "uc",
//!   "category_field": "year",
//!   "value_field": "units",
//!   "long_output": "out/long.csv",
//!   "aggregate": {
//!     "group_by": ["year", "borough"],
//!     "aggregations": [{ "output": "units", "source": "units", "reducer": "sum" }],
//!     "output": "out/totals.csv"
//!   },
//!   "chart": { "category": "year", "series": "borough", "value": "units" }
//! }
//! ```

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use reshape_common::{table_to_dataframe, write_frame_csv};
use reshape_core::{
    Aggregation, CategoryMapping, ConflictPolicy, DEFAULT_CATEGORY_FIELD, DEFAULT_VALUE_FIELD,
    FieldName, LongPivotOptions, PrefixedNumber, WidePivotOptions, aggregate_by, drop_nulls,
    pivot_to_long, pivot_to_wide,
};
use reshape_ingest::{IngestOptions, read_csv_table_with_options, write_csv_table};
use reshape_model::Table;

fn default_category_field() -> String {
    DEFAULT_CATEGORY_FIELD.to_string()
}

fn default_value_field() -> String {
    DEFAULT_VALUE_FIELD.to_string()
}

fn default_true() -> bool {
    true
}

/// Configuration of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Wide CSV input, relative to the job file.
    pub input: PathBuf,
    /// Fields retained on every long row.
    pub identifier_fields: Vec<String>,
    /// Explicit measure fields; takes precedence over `measure_prefix`.
    #[serde(default)]
    pub measure_fields: Option<Vec<String>>,
    /// Selects measure fields by name prefix.
    #[serde(default)]
    pub measure_prefix: Option<String>,
    /// With `measure_prefix`, only accept names whose remainder is all digits.
    #[serde(default = "default_true")]
    pub numeric_suffix_only: bool,
    /// Strip this prefix and parse the rest as an integer category.
    #[serde(default)]
    pub category_prefix: Option<String>,
    #[serde(default = "default_category_field")]
    pub category_field: String,
    #[serde(default = "default_value_field")]
    pub value_field: String,
    /// Drop long rows whose value is null.
    #[serde(default)]
    pub drop_nulls: bool,
    #[serde(default)]
    pub conflict: ConflictPolicy,
    /// Rebuild the wide table from the long one and compare with the input.
    #[serde(default)]
    pub verify_round_trip: bool,
    #[serde(default)]
    pub long_output: Option<PathBuf>,
    #[serde(default)]
    pub aggregate: Option<AggregateStep>,
    #[serde(default)]
    pub chart: Option<ChartStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregateStep {
    pub group_by: Vec<String>,
    pub aggregations: Vec<Aggregation>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Spreads the aggregate into one column per `series` value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartStep {
    pub category: String,
    pub series: String,
    pub value: String,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

/// Tables produced by [`run_job`].
#[derive(Debug)]
pub struct JobOutcome {
    pub input_rows: usize,
    pub measure_fields: Vec<String>,
    pub long: Table,
    pub aggregated: Option<Table>,
    pub chart: Option<Table>,
    /// `Some(true)` when the rebuilt wide table matched the input.
    pub round_trip: Option<bool>,
    pub written: Vec<PathBuf>,
}

pub fn load_job(path: &Path) -> Result<JobConfig> {
    let file = File::open(path).with_context(|| format!("open job: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse job: {}", path.display()))
}

impl JobConfig {
    /// Resolves the measure fields against the input schema.
    pub fn measure_fields_for(&self, table: &Table) -> Result<Vec<String>> {
        if let Some(fields) = &self.measure_fields {
            return Ok(fields.clone());
        }
        let Some(prefix) = &self.measure_prefix else {
            bail!("job needs either measure_fields or measure_prefix");
        };
        measure_fields_with_prefix(table, prefix, self.numeric_suffix_only)
    }

    fn mapping(&self) -> Arc<dyn CategoryMapping> {
        match &self.category_prefix {
            Some(prefix) => Arc::new(PrefixedNumber::new(prefix.clone())),
            None => Arc::new(FieldName),
        }
    }
}

/// Columns named `prefix` followed by a non-empty suffix, in schema order.
///
/// With `numeric_only` the suffix must be all ASCII digits, which keeps
/// identifiers such as `ucbbl` out of a `uc` selection.
pub fn measure_fields_with_prefix(
    table: &Table,
    prefix: &str,
    numeric_only: bool,
) -> Result<Vec<String>> {
    let fields = table.columns_matching(|name| {
        name.strip_prefix(prefix).is_some_and(|rest| {
            !rest.is_empty() && (!numeric_only || rest.chars().all(|ch| ch.is_ascii_digit()))
        })
    });
    if fields.is_empty() {
        bail!("no columns match measure prefix '{prefix}'");
    }
    Ok(fields)
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Runs `config`, resolving relative paths against `base_dir`.
pub fn run_job(config: &JobConfig, base_dir: &Path) -> Result<JobOutcome> {
    let input = resolve(base_dir, &config.input);
    let span = info_span!("job", input = %input.display());
    let _guard = span.enter();

    let wide = read_csv_table_with_options(&input, &IngestOptions::default())?;
    let measure_fields = config.measure_fields_for(&wide)?;
    debug!(measures = ?measure_fields, "selected measure fields");

    let mapping = config.mapping();
    let long_options = LongPivotOptions {
        category_field: config.category_field.clone(),
        value_field: config.value_field.clone(),
        mapping: Arc::clone(&mapping),
    };
    let full_long = pivot_to_long(
        &wide,
        &config.identifier_fields,
        &measure_fields,
        &long_options,
    )
    .context("pivot to long form")?;
    info!(rows = full_long.row_count(), "built long table");

    let round_trip = if config.verify_round_trip {
        let options = WidePivotOptions::new()
            .with_conflict(config.conflict)
            .with_shared_mapping(Arc::clone(&mapping));
        let rebuilt = pivot_to_wide(
            &full_long,
            &config.identifier_fields,
            &config.category_field,
            &config.value_field,
            &options,
        )
        .context("rebuild wide table")?;
        let mut expected_fields = config.identifier_fields.clone();
        expected_fields.extend(measure_fields.iter().cloned());
        let expected = wide.select(&expected_fields)?;
        let matched = rebuilt.is_equivalent(&expected);
        if matched {
            info!("round trip reproduced the input table");
        } else {
            warn!("round trip did not reproduce the input table; identifiers may not be unique");
        }
        Some(matched)
    } else {
        None
    };

    let long = if config.drop_nulls {
        drop_nulls(&full_long, &config.value_field)?
    } else {
        full_long
    };

    let mut written = Vec::new();
    if let Some(path) = &config.long_output {
        let path = resolve(base_dir, path);
        write_csv_table(&long, &path)?;
        written.push(path);
    }

    let aggregated = match &config.aggregate {
        Some(step) => {
            let table = aggregate_by(&long, &step.group_by, &step.aggregations)
                .context("aggregate long table")?;
            info!(groups = table.row_count(), "aggregated long table");
            if let Some(path) = &step.output {
                let path = resolve(base_dir, path);
                write_csv_table(&table, &path)?;
                written.push(path);
            }
            Some(table)
        }
        None => None,
    };

    let chart = match (&config.chart, &aggregated) {
        (Some(step), Some(table)) => {
            let frame = pivot_to_wide(
                table,
                &[step.category.as_str()],
                &step.series,
                &step.value,
                &WidePivotOptions::new().with_conflict(config.conflict),
            )
            .context("build chart frame")?;
            if let Some(path) = &step.output {
                let path = resolve(base_dir, path);
                let mut df = table_to_dataframe(&frame)?;
                write_frame_csv(&mut df, &path)
                    .with_context(|| format!("write chart frame: {}", path.display()))?;
                written.push(path);
            }
            Some(frame)
        }
        (Some(_), None) => bail!("chart step requires an aggregate step"),
        (None, _) => None,
    };

    Ok(JobOutcome {
        input_rows: wide.row_count(),
        measure_fields,
        long,
        aggregated,
        chart,
        round_trip,
        written,
    })
}
