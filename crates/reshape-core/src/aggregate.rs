//! Group-by aggregation.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use reshape_model::{ReshapeError, Result, Table, Value, ValueKey};

use crate::fields::{ensure_distinct, ensure_unclaimed, project, resolve, row_key};

/// Supported reductions. Nulls never participate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reducer {
    /// Sum of non-null values; `0` for a group without any.
    Sum,
    /// Number of non-null values.
    Count,
    /// Arithmetic mean of non-null values; null for a group without any.
    Mean,
    Min,
    Max,
}

impl Reducer {
    fn is_numeric(self) -> bool {
        !matches!(self, Self::Count)
    }
}

impl fmt::Display for Reducer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sum => "sum",
            Self::Count => "count",
            Self::Mean => "mean",
            Self::Min => "min",
            Self::Max => "max",
        };
        f.write_str(name)
    }
}

impl FromStr for Reducer {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sum" => Ok(Self::Sum),
            "count" => Ok(Self::Count),
            "mean" | "avg" | "average" => Ok(Self::Mean),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            other => Err(format!("unknown reducer '{other}'")),
        }
    }
}

/// One requested output field: `reducer` applied to `source` per group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    pub output: String,
    pub source: String,
    pub reducer: Reducer,
}

impl Aggregation {
    pub fn new(output: impl Into<String>, source: impl Into<String>, reducer: Reducer) -> Self {
        Self {
            output: output.into(),
            source: source.into(),
            reducer,
        }
    }

    pub fn sum(output: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(output, source, Reducer::Sum)
    }

    pub fn count(output: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(output, source, Reducer::Count)
    }

    pub fn mean(output: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(output, source, Reducer::Mean)
    }
}

/// Parses `OUTPUT=REDUCER:SOURCE`, e.g. `units=sum:value`.
impl FromStr for Aggregation {
    type Err = String;

    fn from_str(text: &str) -> std::result::Result<Self, Self::Err> {
        let (output, rest) = text
            .split_once('=')
            .ok_or_else(|| format!("expected OUTPUT=REDUCER:SOURCE, got '{text}'"))?;
        let (reducer, source) = rest
            .split_once(':')
            .ok_or_else(|| format!("expected REDUCER:SOURCE after '=', got '{rest}'"))?;
        let (output, source) = (output.trim(), source.trim());
        if output.is_empty() || source.is_empty() {
            return Err(format!("empty output or source field in '{text}'"));
        }
        Ok(Self::new(output, source, reducer.parse()?))
    }
}

#[derive(Debug, Default, Clone)]
struct Accumulator {
    count: usize,
    int_total: i128,
    float_total: f64,
    saw_float: bool,
    min: Option<Value>,
    max: Option<Value>,
}

impl Accumulator {
    fn update(&mut self, value: &Value) {
        match value {
            Value::Null => return,
            Value::Integer(v) => self.int_total += i128::from(*v),
            Value::Float(v) => {
                self.saw_float = true;
                self.float_total += v;
            }
            Value::Text(_) => {}
        }
        self.count += 1;
        if value.is_numeric() {
            replace_if(&mut self.min, value, Ordering::Less);
            replace_if(&mut self.max, value, Ordering::Greater);
        }
    }

    fn finish(&self, reducer: Reducer) -> Value {
        match reducer {
            Reducer::Count => Value::Integer(self.count as i64),
            Reducer::Sum => self.total(),
            Reducer::Mean => {
                if self.count == 0 {
                    Value::Null
                } else {
                    Value::Float(self.float_sum() / self.count as f64)
                }
            }
            Reducer::Min => self.min.clone().unwrap_or_default(),
            Reducer::Max => self.max.clone().unwrap_or_default(),
        }
    }

    fn total(&self) -> Value {
        if !self.saw_float
            && let Ok(total) = i64::try_from(self.int_total)
        {
            return Value::Integer(total);
        }
        Value::Float(self.float_sum())
    }

    fn float_sum(&self) -> f64 {
        self.int_total as f64 + self.float_total
    }
}

fn replace_if(slot: &mut Option<Value>, candidate: &Value, wanted: Ordering) {
    let replace = match slot.as_ref().and_then(Value::as_f64) {
        None => true,
        Some(current) => candidate
            .as_f64()
            .and_then(|value| value.partial_cmp(&current))
            .is_some_and(|ordering| ordering == wanted),
    };
    if replace {
        *slot = Some(candidate.clone());
    }
}

/// Groups rows by `group_fields` and reduces each aggregation per group.
///
/// Groups appear in first-seen order; output columns are the group fields
/// followed by one column per aggregation. An empty input yields an empty
/// table with the output schema.
///
/// # Errors
///
/// `Schema` for missing fields, `DuplicateField` for repeated group fields,
/// `NameCollision` for repeated or group-shadowing output names, and
/// `NonNumeric` when a numeric reducer's source column holds text.
pub fn aggregate_by<S: AsRef<str>>(
    table: &Table,
    group_fields: &[S],
    aggregations: &[Aggregation],
) -> Result<Table> {
    let group_indices = resolve(table, group_fields)?;
    let source_indices = aggregations
        .iter()
        .map(|aggregation| table.require_column(&aggregation.source))
        .collect::<Result<Vec<usize>>>()?;
    let outputs: Vec<&str> = aggregations
        .iter()
        .map(|aggregation| aggregation.output.as_str())
        .collect();
    for output in &outputs {
        ensure_unclaimed(output, group_fields)?;
    }
    ensure_distinct(&outputs).map_err(|err| match err {
        ReshapeError::DuplicateField { field } => ReshapeError::NameCollision { name: field },
        other => other,
    })?;

    for (aggregation, &source) in aggregations.iter().zip(&source_indices) {
        if !aggregation.reducer.is_numeric() {
            continue;
        }
        if let Some(text) = table.rows().iter().find_map(|row| row[source].as_str()) {
            return Err(ReshapeError::NonNumeric {
                field: aggregation.source.clone(),
                value: text.to_string(),
            });
        }
    }

    let mut groups: Vec<(Vec<Value>, Vec<Accumulator>)> = Vec::new();
    let mut slots: HashMap<Vec<ValueKey>, usize> = HashMap::new();
    for row in table.rows() {
        let slot = *slots.entry(row_key(row, &group_indices)).or_insert_with(|| {
            groups.push((
                project(row, &group_indices),
                vec![Accumulator::default(); aggregations.len()],
            ));
            groups.len() - 1
        });
        let accumulators = &mut groups[slot].1;
        for (accumulator, &source) in accumulators.iter_mut().zip(&source_indices) {
            accumulator.update(&row[source]);
        }
    }

    let mut columns: Vec<String> = group_fields
        .iter()
        .map(|field| field.as_ref().to_string())
        .collect();
    columns.extend(outputs.iter().map(|name| (*name).to_string()));
    let mut output = Table::new(columns)?;
    for (mut keys, accumulators) in groups {
        keys.extend(
            accumulators
                .iter()
                .zip(aggregations)
                .map(|(accumulator, aggregation)| accumulator.finish(aggregation.reducer)),
        );
        output.push_row(keys)?;
    }

    debug!(
        input_rows = table.row_count(),
        groups = output.row_count(),
        aggregations = aggregations.len(),
        "aggregated table"
    );
    Ok(output)
}
