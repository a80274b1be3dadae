use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{ReshapeError, Result};
use crate::value::{Value, ValueKey};

/// An immutable-by-convention table: a schema plus rows of equal width.
///
/// Construction validates that column names are unique and that every row
/// carries one value per column; the accessors never hand out mutable rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Creates an empty table with the given schema.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Result<Self> {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        let mut seen = BTreeSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ReshapeError::DuplicateColumn { name: name.clone() });
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Creates a table and fills it with `rows`.
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: impl IntoIterator<Item = Vec<Value>>,
    ) -> Result<Self> {
        let mut table = Self::new(columns)?;
        for row in rows {
            table.push_row(row)?;
        }
        Ok(table)
    }

    /// Appends a row while the table is being built.
    pub fn push_row(&mut self, row: Vec<Value>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(ReshapeError::RowWidth {
                row: self.rows.len(),
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Resolves a column index, failing with [`ReshapeError::Schema`].
    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name).ok_or_else(|| ReshapeError::schema(name))
    }

    /// Resolves several column indices in the given order.
    pub fn require_columns<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|name| self.require_column(name.as_ref()))
            .collect()
    }

    /// Value at `row` for column `name`.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let column = self.column_index(name)?;
        self.rows.get(row).and_then(|values| values.get(column))
    }

    /// All values of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>> {
        let column = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[column]).collect())
    }

    /// Column names accepted by `predicate`, in schema order.
    pub fn columns_matching<F>(&self, mut predicate: F) -> Vec<String>
    where
        F: FnMut(&str) -> bool,
    {
        self.columns
            .iter()
            .filter(|name| predicate(name))
            .cloned()
            .collect()
    }

    /// Column names starting with `prefix`, in schema order.
    pub fn columns_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.columns_matching(|name| name.starts_with(prefix))
    }

    /// Projects the table onto `names`, in the given order.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table> {
        let indices = self.require_columns(names)?;
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&idx| row[idx].clone()).collect());
        Table::from_rows(names.iter().map(|name| name.as_ref().to_string()), rows)
    }

    /// Compares two tables ignoring row and column order.
    ///
    /// Both tables must have the same column set; rows are compared as a
    /// multiset after projecting `other` onto this table's column order.
    pub fn is_equivalent(&self, other: &Table) -> bool {
        if self.columns.len() != other.columns.len() || self.rows.len() != other.rows.len() {
            return false;
        }
        let Ok(projection) = other.require_columns(&self.columns) else {
            return false;
        };
        let mut left: Vec<Vec<ValueKey>> = self
            .rows
            .iter()
            .map(|row| row.iter().map(Value::key).collect())
            .collect();
        let mut right: Vec<Vec<ValueKey>> = other
            .rows
            .iter()
            .map(|row| projection.iter().map(|&idx| row[idx].key()).collect())
            .collect();
        left.sort();
        right.sort();
        left == right
    }
}
