//! Error types for the CSV to Parquet relay
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the relay
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Fetch Errors
    // ============================================================================
    #[error("Object not found: {name}")]
    NotFound { name: String },

    #[error("Failed to fetch '{name}': {message}")]
    Fetch { name: String, message: String },

    #[error("Object '{name}' is {size} bytes, limit is {limit}")]
    ObjectTooLarge { name: String, size: u64, limit: u64 },

    // ============================================================================
    // Parse Errors
    // ============================================================================
    #[error("CSV parsing error: {message}")]
    CsvParse { message: String },

    // ============================================================================
    // Schema Errors
    // ============================================================================
    #[error("No data rows available to infer a schema from")]
    NoRows,

    #[error("Schema inference failed: {message}")]
    SchemaInference { message: String },

    // ============================================================================
    // Encode Errors
    // ============================================================================
    #[error("Row {row_index} is missing column '{column}'")]
    MissingColumn { column: String, row_index: usize },

    #[error("Row {row_index}, column '{column}': cannot read '{value}' as {expected}")]
    TypeMismatch {
        column: String,
        row_index: usize,
        expected: String,
        value: String,
    },

    #[error("No rows to encode")]
    NoData,

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    // ============================================================================
    // Store Errors
    // ============================================================================
    #[error("Failed to store '{name}': {message}")]
    Store { name: String, message: String },

    #[error("Store rejected '{name}': {message}")]
    StoreRejected { name: String, message: String },

    // ============================================================================
    // Run Errors
    // ============================================================================
    #[error("Run timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`], reported with job completions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Config,
    Fetch,
    Parse,
    SchemaInference,
    Encode,
    Store,
    Timeout,
    Other,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Config => "config",
            ErrorKind::Fetch => "fetch",
            ErrorKind::Parse => "parse",
            ErrorKind::SchemaInference => "schema_inference",
            ErrorKind::Encode => "encode",
            ErrorKind::Store => "store",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a not-found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a transient fetch error
    pub fn fetch(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a CSV parse error
    pub fn csv(message: impl Into<String>) -> Self {
        Self::CsvParse {
            message: message.into(),
        }
    }

    /// Create a schema inference error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaInference {
            message: message.into(),
        }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>, row_index: usize) -> Self {
        Self::MissingColumn {
            column: column.into(),
            row_index,
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(
        column: impl Into<String>,
        row_index: usize,
        expected: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            column: column.into(),
            row_index,
            expected: expected.into(),
            value: value.into(),
        }
    }

    /// Create a transient store error
    pub fn store(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Store {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a store rejection error
    pub fn store_rejected(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreRejected {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::MissingConfigField { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_) => ErrorKind::Config,
            Error::NotFound { .. } | Error::Fetch { .. } | Error::ObjectTooLarge { .. } => {
                ErrorKind::Fetch
            }
            Error::CsvParse { .. } => ErrorKind::Parse,
            Error::NoRows | Error::SchemaInference { .. } => ErrorKind::SchemaInference,
            Error::MissingColumn { .. }
            | Error::TypeMismatch { .. }
            | Error::NoData
            | Error::Arrow(_)
            | Error::Parquet(_) => ErrorKind::Encode,
            Error::Store { .. } | Error::StoreRejected { .. } => ErrorKind::Store,
            Error::Timeout { .. } => ErrorKind::Timeout,
            Error::JsonParse(_) | Error::Io(_) | Error::Other(_) => ErrorKind::Other,
        }
    }

    /// Check if this error is transient, so a later trigger may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Fetch { .. } | Error::Store { .. } | Error::Timeout { .. }
        )
    }
}

/// Result type alias for the relay
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
