//! Mappings between measure-field names and category values.
//!
//! A wide table encodes its category in column names (`uc2007`, `uc2008`).
//! The rule for turning a name into a category, and back, is domain specific,
//! so the pivots take it as an injectable [`CategoryMapping`].

use std::fmt;

use reshape_model::{ReshapeError, Result, Value};

/// Converts measure-field names to category values and back.
pub trait CategoryMapping: fmt::Debug + Send + Sync {
    /// Category value for a measure field.
    fn category(&self, field: &str) -> Result<Value>;

    /// Column name for a category value when building a wide table.
    fn column_name(&self, category: &Value) -> String {
        category.to_string()
    }
}

/// Uses the measure-field name itself as a text category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldName;

impl CategoryMapping for FieldName {
    fn category(&self, field: &str) -> Result<Value> {
        Ok(Value::Text(field.to_string()))
    }
}

/// Strips a fixed prefix and parses the remainder as an integer.
///
/// `PrefixedNumber::new("uc")` maps `uc2007` to `2007` and `2007` back to
/// `uc2007`. Only canonical suffixes are accepted (`uc07`, `uc+7` and `uc 7`
/// are rejected) so that every category maps back to the name it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixedNumber {
    prefix: String,
}

impl PrefixedNumber {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl CategoryMapping for PrefixedNumber {
    fn category(&self, field: &str) -> Result<Value> {
        let Some(rest) = field.strip_prefix(self.prefix.as_str()) else {
            return Err(ReshapeError::CategoryParse {
                field: field.to_string(),
                reason: format!("missing prefix '{}'", self.prefix),
            });
        };
        match rest.parse::<i64>() {
            Ok(number) if number.to_string() == rest => Ok(Value::Integer(number)),
            Ok(_) => Err(ReshapeError::CategoryParse {
                field: field.to_string(),
                reason: format!("'{rest}' is not a canonical integer"),
            }),
            Err(_) => Err(ReshapeError::CategoryParse {
                field: field.to_string(),
                reason: format!("'{rest}' is not an integer"),
            }),
        }
    }

    fn column_name(&self, category: &Value) -> String {
        format!("{}{category}", self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_number_parses_year() {
        let mapping = PrefixedNumber::new("uc");
        assert_eq!(mapping.category("uc2007").unwrap(), Value::Integer(2007));
        assert_eq!(mapping.column_name(&Value::Integer(2017)), "uc2017");
    }

    #[test]
    fn prefixed_number_rejects_bad_names() {
        let mapping = PrefixedNumber::new("uc");
        let err = mapping.category("est2007").unwrap_err();
        assert!(matches!(err, ReshapeError::CategoryParse { ref field, .. } if field == "est2007"));
        let err = mapping.category("ucbbl").unwrap_err();
        assert_eq!(
            err,
            ReshapeError::CategoryParse {
                field: "ucbbl".to_string(),
                reason: "'bbl' is not an integer".to_string(),
            }
        );
    }

    #[test]
    fn prefixed_number_requires_canonical_suffix() {
        let mapping = PrefixedNumber::new("uc");
        for name in ["uc07", "uc+7", "uc 7", "uc7 ", "uc-07"] {
            let err = mapping.category(name).unwrap_err();
            assert!(
                matches!(err, ReshapeError::CategoryParse { ref field, .. } if field == name),
                "{name} should be rejected"
            );
        }
        assert_eq!(mapping.category("uc0").unwrap(), Value::Integer(0));
        assert_eq!(mapping.category("uc-7").unwrap(), Value::Integer(-7));
        assert_eq!(mapping.column_name(&Value::Integer(-7)), "uc-7");
    }

    #[test]
    fn field_name_is_identity() {
        let mapping = FieldName;
        let category = mapping.category("uc2007").unwrap();
        assert_eq!(category, Value::from("uc2007"));
        assert_eq!(mapping.column_name(&category), "uc2007");
    }
}
