//! Schema inference module
//!
//! Decides the Parquet column layout for a CSV file from its header row and
//! its first data row.
//!
//! # Rules
//!
//! For each header, in order:
//! - **Numeric**: the sample value parses as a finite number
//! - **Timestamp**: otherwise, the sample value parses as a calendar date/time
//! - **String**: anything else, including empty or missing values
//!
//! Every column is PLAIN-encoded with the inferrer's compression codec.

mod inference;
mod types;

pub use inference::{infer_schema, parse_numeric, parse_timestamp_millis, SchemaInferrer};
pub use types::{ColumnDescriptor, Schema, TIMESTAMP_TZ};

#[cfg(test)]
mod tests;
