//! Core data model for the reshape workspace: cell values, tables and the
//! shared error taxonomy.

pub mod error;
pub mod table;
pub mod value;

pub use error::{ReshapeError, Result};
pub use table::Table;
pub use value::{Value, ValueKey};
