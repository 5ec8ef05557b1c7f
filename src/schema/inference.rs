//! Column type inference from a sample CSV row
//!
//! Each header is typed from its value in the first data row only:
//! numeric wins over timestamp, and anything else is a string.

use super::types::{ColumnDescriptor, Schema};
use crate::error::Result;
use crate::types::{ColumnType, Compression, Row};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Naive datetime layouts, read as UTC
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts, read as midnight UTC
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Schema inferrer with configuration options
#[derive(Debug, Clone)]
pub struct SchemaInferrer {
    /// Compression applied to every column
    compression: Compression,
    /// Detect timestamp columns
    detect_timestamps: bool,
}

impl Default for SchemaInferrer {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaInferrer {
    /// Create a new schema inferrer with default settings
    pub fn new() -> Self {
        Self {
            compression: Compression::default(),
            detect_timestamps: true,
        }
    }

    /// Set the compression codec assigned to every column
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Enable/disable timestamp detection
    #[must_use]
    pub fn with_timestamp_detection(mut self, enabled: bool) -> Self {
        self.detect_timestamps = enabled;
        self
    }

    /// Infer a schema from the header list and one sample row
    pub fn infer(&self, headers: &[String], sample: &Row) -> Result<Schema> {
        let columns = headers
            .iter()
            .map(|header| {
                let value = sample.get(header).map(String::as_str);
                ColumnDescriptor::new(header, self.infer_type(value), self.compression)
            })
            .collect();

        Schema::new(columns)
    }

    /// Infer the type of a single sample value
    pub fn infer_type(&self, value: Option<&str>) -> ColumnType {
        match value {
            Some(v) if parse_numeric(v).is_some() => ColumnType::Numeric,
            Some(v) if self.detect_timestamps && parse_timestamp_millis(v).is_some() => {
                ColumnType::Timestamp
            }
            _ => ColumnType::String,
        }
    }
}

/// Infer a schema with default settings (convenience function)
pub fn infer_schema(headers: &[String], sample: &Row) -> Result<Schema> {
    SchemaInferrer::new().infer(headers, sample)
}

/// Parse a finite decimal number, ignoring surrounding whitespace
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a calendar timestamp into milliseconds since the Unix epoch
pub fn parse_timestamp_millis(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.timestamp_millis());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}
