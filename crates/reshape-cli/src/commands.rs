use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, info_span};

use reshape_cli::job::{JobOutcome, load_job, measure_fields_with_prefix, run_job};
use reshape_core::{
    LongPivotOptions, PrefixedNumber, WidePivotOptions, aggregate_by, drop_nulls, pivot_to_long,
    pivot_to_wide,
};
use reshape_ingest::{IngestOptions, read_csv_table_with_options, write_csv_table};
use reshape_model::Table;

use crate::cli::{AggregateArgs, ColumnsArgs, InputArgs, LongArgs, OutputArgs, RunArgs, WideArgs};
use crate::summary::{print_columns, print_table_preview, print_written};

pub fn run_columns(args: &ColumnsArgs) -> Result<()> {
    let table = read_input(&args.input)?;
    let columns = match &args.prefix {
        Some(prefix) => table.columns_with_prefix(prefix),
        None => table.columns().to_vec(),
    };
    print_columns(&columns);
    Ok(())
}

pub fn run_long(args: &LongArgs) -> Result<()> {
    let span = info_span!("long", input = %args.input.input.display());
    let _guard = span.enter();
    let wide = read_input(&args.input)?;
    let measures = match &args.prefix {
        Some(prefix) => measure_fields_with_prefix(&wide, prefix, !args.any_suffix)?,
        None => args.measures.clone(),
    };

    let mut options = LongPivotOptions::new()
        .with_category_field(args.category.as_str())
        .with_value_field(args.value.as_str());
    if let Some(prefix) = &args.category_prefix {
        options = options.with_mapping(PrefixedNumber::new(prefix.as_str()));
    }
    let mut long = pivot_to_long(&wide, &args.identifiers, &measures, &options)
        .context("pivot to long form")?;
    if args.drop_nulls {
        long = drop_nulls(&long, &args.value)?;
    }
    info!(rows = long.row_count(), measures = measures.len(), "built long table");
    emit(&long, &args.output)
}

pub fn run_wide(args: &WideArgs) -> Result<()> {
    let span = info_span!("wide", input = %args.input.input.display());
    let _guard = span.enter();
    let long = read_input(&args.input)?;
    let mut options = WidePivotOptions::new().with_conflict(args.conflict);
    if let Some(prefix) = &args.column_prefix {
        options = options.with_mapping(PrefixedNumber::new(prefix.as_str()));
    }
    let wide = pivot_to_wide(
        &long,
        &args.identifiers,
        &args.category,
        &args.value,
        &options,
    )
    .context("pivot to wide form")?;
    info!(rows = wide.row_count(), columns = wide.column_count(), "built wide table");
    emit(&wide, &args.output)
}

pub fn run_aggregate(args: &AggregateArgs) -> Result<()> {
    let span = info_span!("aggregate", input = %args.input.input.display());
    let _guard = span.enter();
    let table = read_input(&args.input)?;
    let grouped =
        aggregate_by(&table, &args.group_by, &args.aggregations).context("aggregate table")?;
    info!(groups = grouped.row_count(), "aggregated table");
    emit(&grouped, &args.output)
}

pub fn run_pipeline(args: &RunArgs) -> Result<JobOutcome> {
    let config = load_job(&args.job)?;
    let base_dir = args.job.parent().unwrap_or_else(|| Path::new("."));
    run_job(&config, base_dir)
}

fn read_input(args: &InputArgs) -> Result<Table> {
    if !args.delimiter.is_ascii() {
        bail!("delimiter must be a single ASCII character, got '{}'", args.delimiter);
    }
    let options = IngestOptions::default()
        .with_delimiter(args.delimiter as u8)
        .with_infer_types(!args.no_infer);
    read_csv_table_with_options(&args.input, &options)
}

fn emit(table: &Table, output: &OutputArgs) -> Result<()> {
    match &output.output {
        Some(path) => {
            write_csv_table(table, path)?;
            print_written(path, table.row_count());
        }
        None => print_table_preview(table, output.preview_rows),
    }
    Ok(())
}
