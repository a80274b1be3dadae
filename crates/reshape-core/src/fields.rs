use std::collections::BTreeSet;

use reshape_model::{ReshapeError, Result, Table, Value, ValueKey};

/// Fails with `DuplicateField` when a name appears twice in `names`.
pub(crate) fn ensure_distinct<S: AsRef<str>>(names: &[S]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name.as_ref()) {
            return Err(ReshapeError::DuplicateField {
                field: name.as_ref().to_string(),
            });
        }
    }
    Ok(())
}

/// Fails with `OverlappingFields` when a pivoted field is also an identifier.
pub(crate) fn ensure_disjoint<S: AsRef<str>, T: AsRef<str>>(
    identifiers: &[S],
    pivoted: &[T],
) -> Result<()> {
    for field in pivoted {
        let field = field.as_ref();
        if identifiers.iter().any(|id| id.as_ref() == field) {
            return Err(ReshapeError::OverlappingFields {
                field: field.to_string(),
            });
        }
    }
    Ok(())
}

/// Fails with `NameCollision` when `name` is already taken.
pub(crate) fn ensure_unclaimed<S: AsRef<str>>(name: &str, taken: &[S]) -> Result<()> {
    if taken.iter().any(|existing| existing.as_ref() == name) {
        return Err(ReshapeError::NameCollision {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Resolves every name against the schema, then checks for repeats.
pub(crate) fn resolve<S: AsRef<str>>(table: &Table, names: &[S]) -> Result<Vec<usize>> {
    let indices = table.require_columns(names)?;
    ensure_distinct(names)?;
    Ok(indices)
}

pub(crate) fn row_key(row: &[Value], indices: &[usize]) -> Vec<ValueKey> {
    indices.iter().map(|&idx| row[idx].key()).collect()
}

pub(crate) fn project(row: &[Value], indices: &[usize]) -> Vec<Value> {
    indices.iter().map(|&idx| row[idx].clone()).collect()
}
