//! Core domain types and logic: fin-dtypes, tagged columns and tables,
//! indicators and preprocessing.

pub mod dtype;
pub mod dates;
pub mod frame;
pub mod column;
pub mod table;
pub mod stats;
pub mod indicator;
pub mod processing;
pub mod config_validation;
pub mod error;
