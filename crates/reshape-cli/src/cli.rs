//! CLI argument definitions for the reshape tool.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use reshape_core::{Aggregation, ConflictPolicy, DEFAULT_CATEGORY_FIELD, DEFAULT_VALUE_FIELD};

#[derive(Parser)]
#[command(
    name = "reshape",
    version,
    about = "Pivot tabular datasets between wide and long form",
    long_about = "Pivot tabular datasets between wide and long form.\n\n\
                  Turns one-column-per-year tables into one-row-per-year tables \
                  and back, and aggregates long tables by group."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the columns of a CSV file.
    Columns(ColumnsArgs),

    /// Pivot a wide table to long form.
    Long(LongArgs),

    /// Pivot a long table to wide form.
    Wide(WideArgs),

    /// Group a table and reduce its fields.
    Aggregate(AggregateArgs),

    /// Run a pipeline described by a JSON job file.
    Run(RunArgs),
}

/// Input file and parsing flags shared by every table command.
#[derive(Args)]
pub struct InputArgs {
    /// CSV file to read.
    #[arg(value_name = "CSV")]
    pub input: PathBuf,

    /// Field delimiter.
    #[arg(long = "delimiter", default_value_t = ',')]
    pub delimiter: char,

    /// Keep every cell as text instead of inferring numbers.
    #[arg(long = "no-infer")]
    pub no_infer: bool,
}

/// Where results go.
#[derive(Args)]
pub struct OutputArgs {
    /// Write the result as CSV instead of printing a preview.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Rows shown in the preview.
    #[arg(long = "preview-rows", default_value_t = 20)]
    pub preview_rows: usize,
}

#[derive(Parser)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only list columns starting with this prefix.
    #[arg(long = "prefix")]
    pub prefix: Option<String>,
}

#[derive(Parser)]
pub struct LongArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Identifier fields kept on every long row (repeat the flag or separate
    /// with commas).
    #[arg(long = "id", value_name = "FIELD", required = true, value_delimiter = ',')]
    pub identifiers: Vec<String>,

    /// Measure fields to pivot, in output order.
    #[arg(
        long = "measure",
        value_name = "FIELD",
        value_delimiter = ',',
        conflicts_with = "prefix",
        required_unless_present = "prefix"
    )]
    pub measures: Vec<String>,

    /// Select measure fields by name prefix.
    #[arg(long = "prefix", value_name = "PREFIX")]
    pub prefix: Option<String>,

    /// With --prefix, also accept non-numeric suffixes.
    #[arg(long = "any-suffix", requires = "prefix")]
    pub any_suffix: bool,

    /// Name of the generated category field.
    #[arg(long = "category", default_value = DEFAULT_CATEGORY_FIELD)]
    pub category: String,

    /// Name of the generated value field.
    #[arg(long = "value", default_value = DEFAULT_VALUE_FIELD)]
    pub value: String,

    /// Strip this prefix from measure names and parse the rest as an integer.
    #[arg(long = "category-prefix", value_name = "PREFIX")]
    pub category_prefix: Option<String>,

    /// Drop rows whose value is null.
    #[arg(long = "drop-nulls")]
    pub drop_nulls: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct WideArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Identifier fields; one output row per distinct combination.
    #[arg(long = "id", value_name = "FIELD", required = true, value_delimiter = ',')]
    pub identifiers: Vec<String>,

    /// Field whose values become column names.
    #[arg(long = "category", value_name = "FIELD")]
    pub category: String,

    /// Field whose values fill the generated columns.
    #[arg(long = "value", value_name = "FIELD")]
    pub value: String,

    /// How to resolve duplicate (identifier, category) records.
    #[arg(long = "conflict", default_value = "last-wins")]
    pub conflict: ConflictPolicy,

    /// Prefix for generated column names (e.g. `uc` gives `uc2007`).
    #[arg(long = "column-prefix", value_name = "PREFIX")]
    pub column_prefix: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct AggregateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Grouping fields.
    #[arg(long = "by", value_name = "FIELD", required = true, value_delimiter = ',')]
    pub group_by: Vec<String>,

    /// Output field as OUTPUT=REDUCER:SOURCE (sum, count, mean, min, max).
    #[arg(long = "agg", value_name = "OUT=REDUCER:SOURCE", required = true)]
    pub aggregations: Vec<Aggregation>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Path to the job file.
    #[arg(value_name = "JOB")]
    pub job: PathBuf,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
