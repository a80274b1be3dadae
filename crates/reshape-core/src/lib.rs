//! Reshape engine: wide-to-long and long-to-wide pivots plus group
//! aggregation over [`reshape_model::Table`].
//!
//! Every operation borrows its input and returns a new table. Field lists are
//! resolved against the schema before any row is touched, so errors never
//! leave a half-built result behind.
//!
//! ```
//! use reshape_core::{LongPivotOptions, PrefixedNumber, pivot_to_long};
//! use reshape_model::{Table, Value};
//!
//! let wide = Table::from_rows(
//!     ["id", "uc2007", "uc2008"],
//!     vec![vec![Value::from("A"), Value::Integer(10), Value::Null]],
//! )
//! .unwrap();
//! let options = LongPivotOptions::new()
//!     .with_category_field("year")
//!     .with_value_field("units")
//!     .with_mapping(PrefixedNumber::new("uc"));
//! let long = pivot_to_long(&wide, &["id"], &["uc2007", "uc2008"], &options).unwrap();
//! assert_eq!(long.row_count(), 2);
//! assert_eq!(long.value(0, "year"), Some(&Value::Integer(2007)));
//! ```

pub mod aggregate;
pub mod category;
mod fields;
pub mod filter;
pub mod long;
pub mod wide;

pub use aggregate::{Aggregation, Reducer, aggregate_by};
pub use category::{CategoryMapping, FieldName, PrefixedNumber};
pub use filter::drop_nulls;
pub use long::{DEFAULT_CATEGORY_FIELD, DEFAULT_VALUE_FIELD, LongPivotOptions, pivot_to_long};
pub use wide::{ConflictPolicy, WidePivotOptions, pivot_to_wide};
