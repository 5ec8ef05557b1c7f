//! Row source types
//!
//! Defines the parser events and the parser configuration.

use crate::error::Error;
use crate::types::Row;
use serde::{Deserialize, Serialize};

/// One step of a parsed CSV stream
///
/// A stream yields `Headers`, then any number of `Row`s, then exactly one
/// terminal `End` or `Error`.
#[derive(Debug)]
pub enum RowEvent {
    /// Header row, in column order
    Headers(Vec<String>),
    /// One data row keyed by header
    Row(Row),
    /// Input ended normally
    End,
    /// Malformed input or upstream stream failure
    Error(Error),
}

impl RowEvent {
    /// Whether this event ends the sequence
    pub fn is_terminal(&self) -> bool {
        matches!(self, RowEvent::End | RowEvent::Error(_))
    }
}

/// Policy for rows whose field count differs from the header count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaggedRows {
    /// Fail the stream with a parse error
    #[default]
    Reject,
    /// Pad missing fields with empty strings, drop extra fields
    PadOrTruncate,
}

/// Configuration for parsing CSV input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Field delimiter (default: comma)
    pub delimiter: char,
    /// Field-count mismatch handling
    pub ragged_rows: RaggedRows,
    /// Read buffer size in bytes
    pub buffer_capacity: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            ragged_rows: RaggedRows::default(),
            buffer_capacity: 64 * 1024,
        }
    }
}

impl SourceConfig {
    /// Create a comma-separated config
    pub fn csv() -> Self {
        Self::default()
    }

    /// Create a config with a custom delimiter
    pub fn with_delimiter(delimiter: char) -> Self {
        Self {
            delimiter,
            ..Default::default()
        }
    }

    /// Set the ragged row policy
    #[must_use]
    pub fn with_ragged_rows(mut self, policy: RaggedRows) -> Self {
        self.ragged_rows = policy;
        self
    }

    /// Delimiter as a single byte, if it is ASCII
    pub fn delimiter_byte(&self) -> Option<u8> {
        u8::try_from(self.delimiter).ok().filter(u8::is_ascii)
    }
}
