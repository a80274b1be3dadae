//! CLI library components for the reshape tool.

pub mod job;
pub mod logging;
