//! Parquet writer configuration
//!
//! Maps a [`Schema`]'s per-column encoding and compression onto Parquet
//! writer properties.

use crate::schema::Schema;
use crate::types::Compression;
use parquet::file::properties::{EnabledStatistics, WriterProperties};
use parquet::schema::types::ColumnPath;
use serde::{Deserialize, Serialize};

/// Configuration for the columnar encoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Compression codec assigned to inferred columns
    pub compression: Compression,
    /// Rows buffered per Arrow record batch
    pub batch_size: usize,
    /// Maximum rows per Parquet row group
    pub row_group_size: usize,
    /// Write column statistics
    pub statistics: bool,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            compression: Compression::Snappy,
            batch_size: 8192,
            row_group_size: 1024 * 1024, // 1M rows
            statistics: true,
        }
    }
}

impl EncoderConfig {
    /// Create a new config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set compression codec
    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set rows per record batch
    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set row group size
    #[must_use]
    pub fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Use no compression
    #[must_use]
    pub fn uncompressed(mut self) -> Self {
        self.compression = Compression::Uncompressed;
        self
    }

    /// Build writer properties for `schema`
    pub(crate) fn build_properties(&self, schema: &Schema) -> WriterProperties {
        let mut builder = WriterProperties::builder()
            .set_max_row_group_size(self.row_group_size.max(1))
            .set_created_by(format!("{} {}", crate::NAME, crate::VERSION));

        if !self.statistics {
            builder = builder.set_statistics_enabled(EnabledStatistics::None);
        }

        for column in schema.columns() {
            let path = ColumnPath::from(column.name.as_str());
            builder = builder
                .set_column_dictionary_enabled(path.clone(), false)
                .set_column_encoding(path.clone(), column.encoding.into())
                .set_column_compression(path, column.compression.into());
        }

        builder.build()
    }
}
