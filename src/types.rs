//! Common types used throughout the relay
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Type Aliases
// ============================================================================

/// Generic key-value map with string keys and values
pub type StringMap = HashMap<String, String>;

/// One parsed CSV data row, keyed by header name
pub type Row = StringMap;

// ============================================================================
// Column Type
// ============================================================================

/// Logical type of a column in the Parquet output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ColumnType {
    /// UTF-8 text, passed through unchanged
    #[default]
    String,
    /// 64-bit floating point
    Numeric,
    /// Milliseconds since the Unix epoch, UTC
    Timestamp,
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::String => write!(f, "string"),
            ColumnType::Numeric => write!(f, "numeric"),
            ColumnType::Timestamp => write!(f, "timestamp"),
        }
    }
}

// ============================================================================
// Encoding
// ============================================================================

/// Value encoding of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Encoding {
    #[default]
    Plain,
}

impl From<Encoding> for parquet::basic::Encoding {
    fn from(encoding: Encoding) -> Self {
        match encoding {
            Encoding::Plain => parquet::basic::Encoding::PLAIN,
        }
    }
}

// ============================================================================
// Compression
// ============================================================================

/// Lossless compression codec of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Compression {
    Uncompressed,
    #[default]
    Snappy,
}

impl From<Compression> for parquet::basic::Compression {
    fn from(compression: Compression) -> Self {
        match compression {
            Compression::Uncompressed => parquet::basic::Compression::UNCOMPRESSED,
            Compression::Snappy => parquet::basic::Compression::SNAPPY,
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_conversion() {
        let snappy: parquet::basic::Compression = Compression::Snappy.into();
        assert_eq!(snappy, parquet::basic::Compression::SNAPPY);
        let none: parquet::basic::Compression = Compression::Uncompressed.into();
        assert_eq!(none, parquet::basic::Compression::UNCOMPRESSED);
    }

    #[test]
    fn test_column_type_serde() {
        let t: ColumnType = serde_json::from_str("\"TIMESTAMP\"").unwrap();
        assert_eq!(t, ColumnType::Timestamp);

        let json = serde_json::to_string(&ColumnType::Numeric).unwrap();
        assert_eq!(json, "\"NUMERIC\"");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ColumnType::default(), ColumnType::String);
        assert_eq!(Encoding::default(), Encoding::Plain);
        assert_eq!(Compression::default(), Compression::Snappy);
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some(String::new()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
        assert_eq!(String::new().none_if_empty(), None);
    }
}
