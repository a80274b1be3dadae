//! Delimited-text input and output for reshape tables.

pub mod csv_table;
pub mod writer;

pub use csv_table::{IngestOptions, read_csv_reader, read_csv_table, read_csv_table_with_options};
pub use writer::{to_csv_string, write_csv, write_csv_table};
