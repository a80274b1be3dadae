//! Shared utilities for handing reshape tables to DataFrame-based
//! collaborators such as charting and spatial-join code.

pub mod polars;

pub use polars::{any_to_value, dataframe_to_table, table_to_dataframe, write_frame_csv};
