//! Wide-to-long pivot.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use reshape_model::{ReshapeError, Result, Table, Value};

use crate::category::{CategoryMapping, FieldName};
use crate::fields::{ensure_disjoint, ensure_unclaimed, project, resolve};

/// Default name of the generated category field.
pub const DEFAULT_CATEGORY_FIELD: &str = "category";
/// Default name of the generated value field.
pub const DEFAULT_VALUE_FIELD: &str = "value";

/// Options for [`pivot_to_long`].
#[derive(Debug, Clone)]
pub struct LongPivotOptions {
    /// Name of the generated category field.
    pub category_field: String,
    /// Name of the generated value field.
    pub value_field: String,
    /// Rule deriving a category value from each measure-field name.
    pub mapping: Arc<dyn CategoryMapping>,
}

impl Default for LongPivotOptions {
    fn default() -> Self {
        Self {
            category_field: DEFAULT_CATEGORY_FIELD.to_string(),
            value_field: DEFAULT_VALUE_FIELD.to_string(),
            mapping: Arc::new(FieldName),
        }
    }
}

impl LongPivotOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_category_field(mut self, name: impl Into<String>) -> Self {
        self.category_field = name.into();
        self
    }

    #[must_use]
    pub fn with_value_field(mut self, name: impl Into<String>) -> Self {
        self.value_field = name.into();
        self
    }

    #[must_use]
    pub fn with_mapping(mut self, mapping: impl CategoryMapping + 'static) -> Self {
        self.mapping = Arc::new(mapping);
        self
    }
}

/// Collapses `measure_fields` into one row per input row and measure field.
///
/// Output columns are the identifier fields in the given order followed by
/// the category and value fields. Rows keep input order, and within one input
/// row the measure order. Null measure values are carried through as null
/// values; the output always holds `rows x measure_fields` rows.
///
/// # Errors
///
/// Fails before emitting any row when a field is missing (`Schema`), listed
/// twice (`DuplicateField`), used both as identifier and measure
/// (`OverlappingFields`), when a generated name is already taken
/// (`NameCollision`), when the mapping rejects a measure name
/// (`CategoryParse`), or when two measures map to the same category
/// (`NameCollision` naming the later measure).
pub fn pivot_to_long<S: AsRef<str>>(
    table: &Table,
    identifier_fields: &[S],
    measure_fields: &[S],
    options: &LongPivotOptions,
) -> Result<Table> {
    let id_indices = resolve(table, identifier_fields)?;
    let measure_indices = resolve(table, measure_fields)?;
    ensure_disjoint(identifier_fields, measure_fields)?;
    ensure_unclaimed(&options.category_field, identifier_fields)?;
    ensure_unclaimed(&options.value_field, identifier_fields)?;
    if options.category_field == options.value_field {
        return Err(ReshapeError::NameCollision {
            name: options.value_field.clone(),
        });
    }

    let categories = measure_fields
        .iter()
        .map(|field| options.mapping.category(field.as_ref()))
        .collect::<Result<Vec<Value>>>()?;
    let mut seen = HashSet::new();
    for (field, category) in measure_fields.iter().zip(&categories) {
        if !seen.insert(category.key()) {
            return Err(ReshapeError::NameCollision {
                name: field.as_ref().to_string(),
            });
        }
    }

    let mut columns: Vec<String> = identifier_fields
        .iter()
        .map(|field| field.as_ref().to_string())
        .collect();
    columns.push(options.category_field.clone());
    columns.push(options.value_field.clone());
    let mut output = Table::new(columns)?;

    for row in table.rows() {
        let identifiers = project(row, &id_indices);
        for (category, &measure_idx) in categories.iter().zip(&measure_indices) {
            let mut long_row = Vec::with_capacity(identifiers.len() + 2);
            long_row.extend(identifiers.iter().cloned());
            long_row.push(category.clone());
            long_row.push(row[measure_idx].clone());
            output.push_row(long_row)?;
        }
    }

    debug!(
        input_rows = table.row_count(),
        measures = measure_fields.len(),
        output_rows = output.row_count(),
        "pivoted to long form"
    );
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::PrefixedNumber;

    fn wide() -> Table {
        let rows: Vec<Vec<Value>> = vec![
            vec!["A".into(), 10.into(), Value::Null],
            vec!["B".into(), 5.into(), 20.into()],
        ];
        Table::from_rows(["id", "uc2007", "uc2008"], rows).expect("wide table")
    }

    #[test]
    fn default_options_keep_field_names_as_categories() {
        let long = pivot_to_long(
            &wide(),
            &["id"],
            &["uc2007", "uc2008"],
            &LongPivotOptions::default(),
        )
        .expect("pivot");
        assert_eq!(long.columns(), ["id", "category", "value"]);
        assert_eq!(long.value(1, "category"), Some(&Value::from("uc2008")));
    }

    #[test]
    fn rejects_category_name_taken_by_identifier() {
        let options = LongPivotOptions::new().with_category_field("id");
        let err = pivot_to_long(&wide(), &["id"], &["uc2007"], &options).unwrap_err();
        assert_eq!(
            err,
            ReshapeError::NameCollision {
                name: "id".to_string()
            }
        );
    }

    #[test]
    fn rejects_equal_generated_names() {
        let options = LongPivotOptions::new()
            .with_category_field("x")
            .with_value_field("x");
        let err = pivot_to_long(&wide(), &["id"], &["uc2007"], &options).unwrap_err();
        assert!(matches!(err, ReshapeError::NameCollision { .. }));
    }

    #[test]
    fn rejects_overlapping_fields() {
        let err = pivot_to_long(
            &wide(),
            &["id", "uc2007"],
            &["uc2007", "uc2008"],
            &LongPivotOptions::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ReshapeError::OverlappingFields {
                field: "uc2007".to_string()
            }
        );
    }

    #[test]
    fn rejects_repeated_measure() {
        let err = pivot_to_long(
            &wide(),
            &["id"],
            &["uc2007", "uc2007"],
            &LongPivotOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ReshapeError::DuplicateField { .. }));
    }

    #[test]
    fn mapping_failure_is_reported_before_rows() {
        let options = LongPivotOptions::new().with_mapping(PrefixedNumber::new("est"));
        let err = pivot_to_long(&wide(), &["id"], &["uc2007"], &options).unwrap_err();
        assert!(matches!(err, ReshapeError::CategoryParse { .. }));
    }

    #[test]
    fn measures_mapping_to_one_category_collide() {
        let rows: Vec<Vec<Value>> = vec![vec!["A".into(), 1.into(), 2.into()]];
        let table = Table::from_rows(["id", "uc7", "uc-7"], rows).expect("table");
        let options = LongPivotOptions::new().with_mapping(SameCategory);
        let err = pivot_to_long(&table, &["id"], &["uc7", "uc-7"], &options).unwrap_err();
        assert_eq!(
            err,
            ReshapeError::NameCollision {
                name: "uc-7".to_string()
            }
        );
    }

    #[derive(Debug)]
    struct SameCategory;

    impl CategoryMapping for SameCategory {
        fn category(&self, _field: &str) -> Result<Value> {
            Ok(Value::Integer(7))
        }
    }

    #[test]
    fn non_canonical_measure_names_fail_before_rows() {
        let rows: Vec<Vec<Value>> = vec![vec!["A".into(), 1.into(), 2.into()]];
        let table = Table::from_rows(["id", "uc7", "uc07"], rows).expect("table");
        let options = LongPivotOptions::new().with_mapping(PrefixedNumber::new("uc"));
        let err = pivot_to_long(&table, &["id"], &["uc7", "uc07"], &options).unwrap_err();
        assert!(matches!(err, ReshapeError::CategoryParse { ref field, .. } if field == "uc07"));
    }

    #[test]
    fn empty_measures_yield_no_rows() {
        let measures: [&str; 0] = [];
        let ids: [&str; 1] = ["id"];
        let long = pivot_to_long(&wide(), &ids, &measures, &LongPivotOptions::default())
            .expect("pivot");
        assert!(long.is_empty());
        assert_eq!(long.column_count(), 3);
    }
}
