//! Long-to-wide pivot.

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use reshape_model::{ReshapeError, Result, Table, Value, ValueKey};

use crate::category::CategoryMapping;
use crate::fields::{ensure_disjoint, ensure_unclaimed, project, resolve, row_key};

/// How [`pivot_to_wide`] resolves several records that share an identifier
/// combination and category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// The last record in input order wins, even when its value is null.
    #[default]
    LastWins,
    /// The first record in input order wins.
    FirstWins,
    /// Any duplicate fails the pivot with `ReshapeError::Conflict`.
    Reject,
}

impl FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "last-wins" | "last" => Ok(Self::LastWins),
            "first-wins" | "first" => Ok(Self::FirstWins),
            "reject" | "error" => Ok(Self::Reject),
            other => Err(format!(
                "unknown conflict policy '{other}' (expected last-wins, first-wins or reject)"
            )),
        }
    }
}

/// Options for [`pivot_to_wide`].
#[derive(Debug, Clone, Default)]
pub struct WidePivotOptions {
    pub conflict: ConflictPolicy,
    /// Names generated columns; without it the stringified category is used.
    pub mapping: Option<Arc<dyn CategoryMapping>>,
}

impl WidePivotOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_conflict(mut self, conflict: ConflictPolicy) -> Self {
        self.conflict = conflict;
        self
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: impl CategoryMapping + 'static) -> Self {
        self.mapping = Some(Arc::new(mapping));
        self
    }

    #[must_use]
    pub fn with_shared_mapping(mut self, mapping: Arc<dyn CategoryMapping>) -> Self {
        self.mapping = Some(mapping);
        self
    }

    fn column_name(&self, category: &Value) -> String {
        match &self.mapping {
            Some(mapping) => mapping.column_name(category),
            None => category.to_string(),
        }
    }
}

/// Spreads `category_field` into one column per distinct category.
///
/// One output row per distinct identifier combination and one column per
/// distinct non-null category, both in first-seen order. Each cell holds the
/// `value_field` of the matching record, or null when none exists. Records
/// with a null category add no column but still produce their row.
///
/// # Errors
///
/// `Schema` for missing fields, `OverlappingFields` when the category or value
/// field is also an identifier, `EmptyCategoryDomain` when no category is
/// non-null, `NameCollision` when a generated column name is already taken,
/// and `Conflict` for duplicates under [`ConflictPolicy::Reject`].
pub fn pivot_to_wide<S: AsRef<str>>(
    table: &Table,
    identifier_fields: &[S],
    category_field: &str,
    value_field: &str,
    options: &WidePivotOptions,
) -> Result<Table> {
    let id_indices = resolve(table, identifier_fields)?;
    let category_idx = table.require_column(category_field)?;
    let value_idx = table.require_column(value_field)?;
    ensure_disjoint(identifier_fields, &[category_field, value_field])?;
    if category_field == value_field {
        return Err(ReshapeError::DuplicateField {
            field: value_field.to_string(),
        });
    }

    let mut categories: Vec<&Value> = Vec::new();
    let mut category_slots: HashMap<ValueKey, usize> = HashMap::new();
    for row in table.rows() {
        let category = &row[category_idx];
        if category.is_null() {
            continue;
        }
        category_slots.entry(category.key()).or_insert_with(|| {
            categories.push(category);
            categories.len() - 1
        });
    }
    if categories.is_empty() {
        return Err(ReshapeError::EmptyCategoryDomain {
            field: category_field.to_string(),
        });
    }

    let mut columns: Vec<String> = identifier_fields
        .iter()
        .map(|field| field.as_ref().to_string())
        .collect();
    let mut generated = BTreeSet::new();
    for category in &categories {
        let name = options.column_name(category);
        ensure_unclaimed(&name, identifier_fields)?;
        if !generated.insert(name.clone()) {
            return Err(ReshapeError::NameCollision { name });
        }
        columns.push(name);
    }

    let width = id_indices.len() + categories.len();
    let mut rows: Vec<Vec<Value>> = Vec::new();
    let mut filled: Vec<Vec<bool>> = Vec::new();
    let mut row_slots: HashMap<Vec<ValueKey>, usize> = HashMap::new();
    let mut null_categories = 0usize;
    let mut conflicts = 0usize;

    for row in table.rows() {
        let slot = *row_slots.entry(row_key(row, &id_indices)).or_insert_with(|| {
            let mut wide_row = project(row, &id_indices);
            wide_row.resize(width, Value::Null);
            rows.push(wide_row);
            filled.push(vec![false; categories.len()]);
            rows.len() - 1
        });

        let category = &row[category_idx];
        if category.is_null() {
            null_categories += 1;
            continue;
        }
        let column = category_slots[&category.key()];
        if filled[slot][column] {
            conflicts += 1;
            match options.conflict {
                ConflictPolicy::LastWins => {}
                ConflictPolicy::FirstWins => continue,
                ConflictPolicy::Reject => {
                    return Err(ReshapeError::Conflict {
                        identifiers: describe_identifiers(&rows[slot][..id_indices.len()]),
                        category: category.to_string(),
                    });
                }
            }
        }
        filled[slot][column] = true;
        rows[slot][id_indices.len() + column] = row[value_idx].clone();
    }

    if null_categories > 0 {
        warn!(
            records = null_categories,
            field = category_field,
            "records with null category contribute no column"
        );
    }
    debug!(
        input_rows = table.row_count(),
        output_rows = rows.len(),
        categories = categories.len(),
        conflicts,
        policy = ?options.conflict,
        "pivoted to wide form"
    );
    Table::from_rows(columns, rows)
}

fn describe_identifiers(values: &[Value]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
