use thiserror::Error;

/// Errors raised while validating or transforming a table.
///
/// Every variant is detected before rows are emitted, so a failed call never
/// yields a partially reshaped table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ReshapeError {
    /// A referenced field is absent from the table's schema.
    #[error("field not found in schema: {field}")]
    Schema { field: String },

    /// A generated field name clashes with a retained or generated field.
    #[error("generated field name '{name}' collides with an existing field")]
    NameCollision { name: String },

    /// The wide pivot found no non-null category values to expand into.
    #[error("category field '{field}' has no non-null values to pivot into columns")]
    EmptyCategoryDomain { field: String },

    /// A field was named both as identifier and as pivoted field.
    #[error("field '{field}' is listed both as identifier and as pivoted field")]
    OverlappingFields { field: String },

    /// A field was listed more than once in the same role.
    #[error("field '{field}' is listed more than once")]
    DuplicateField { field: String },

    /// The category mapping rejected a measure-field name.
    #[error("cannot derive category from field '{field}': {reason}")]
    CategoryParse { field: String, reason: String },

    /// Two records share an identifier combination and category under a
    /// rejecting conflict policy.
    #[error("conflicting records for identifiers ({identifiers}) and category '{category}'")]
    Conflict {
        identifiers: String,
        category: String,
    },

    /// A numeric reduction met a text value.
    #[error("field '{field}' holds non-numeric value '{value}'")]
    NonNumeric { field: String, value: String },

    /// A row does not carry one value per column.
    #[error("row {row} has {actual} values, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A schema names the same column twice.
    #[error("duplicate column name: {name}")]
    DuplicateColumn { name: String },
}

impl ReshapeError {
    pub(crate) fn schema(field: impl Into<String>) -> Self {
        Self::Schema {
            field: field.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReshapeError>;
