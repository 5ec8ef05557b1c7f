//! Schema types

use crate::error::{Error, Result};
use crate::types::{ColumnType, Compression, Encoding};
use arrow::datatypes::{DataType, Field, Schema as ArrowSchema, TimeUnit};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Timezone attached to timestamp columns
pub const TIMESTAMP_TZ: &str = "UTC";

/// Declaration of one output column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column name, taken from the CSV header
    pub name: String,

    /// Logical type
    #[serde(rename = "type")]
    pub column_type: ColumnType,

    /// Value encoding
    pub encoding: Encoding,

    /// Compression codec
    pub compression: Compression,
}

impl ColumnDescriptor {
    /// Create a PLAIN-encoded column
    pub fn new(name: impl Into<String>, column_type: ColumnType, compression: Compression) -> Self {
        Self {
            name: name.into(),
            column_type,
            encoding: Encoding::Plain,
            compression,
        }
    }

    /// Arrow data type backing this column
    pub fn data_type(&self) -> DataType {
        match self.column_type {
            ColumnType::String => DataType::Utf8,
            ColumnType::Numeric => DataType::Float64,
            ColumnType::Timestamp => {
                DataType::Timestamp(TimeUnit::Millisecond, Some(TIMESTAMP_TZ.into()))
            }
        }
    }

    /// Arrow field for this column (never nullable)
    pub fn to_field(&self) -> Field {
        Field::new(&self.name, self.data_type(), false)
    }
}

/// Ordered set of column descriptors
///
/// Column names are unique and non-empty; order is the CSV header order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDescriptor>,
}

impl Schema {
    /// Build a schema, rejecting empty or duplicate names
    pub fn new(columns: Vec<ColumnDescriptor>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for (position, column) in columns.iter().enumerate() {
            if column.name.is_empty() {
                return Err(Error::schema(format!(
                    "column {} has an empty name",
                    position + 1
                )));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(Error::schema(format!(
                    "duplicate column name '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns })
    }

    /// Columns in declaration order
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Look up a column by name
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Convert to an Arrow schema
    pub fn to_arrow(&self) -> ArrowSchema {
        ArrowSchema::new(
            self.columns
                .iter()
                .map(ColumnDescriptor::to_field)
                .collect::<Vec<_>>(),
        )
    }

    /// Convert to pretty JSON string
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
