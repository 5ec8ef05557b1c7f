//! Relay configuration
//!
//! Loaded from a YAML file, then overridden from `RELAY_*` environment
//! variables, then validated before anything starts.
//!
//! ```yaml
//! source: az://incoming/csv
//! destination: az://converted/parquet
//! object: blobName.csv
//! interval_secs: 5
//! csv:
//!   delimiter: ","
//! parquet:
//!   compression: SNAPPY
//! ```

use crate::encode::EncoderConfig;
use crate::error::{Error, Result, ResultExt};
use crate::scheduler::{DEFAULT_INTERVAL, MIN_INTERVAL};
use crate::source::SourceConfig;
use crate::storage::{ObjectBlobStore, StoreOptions};
use crate::types::OptionStringExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable overriding [`RelayConfig::source`]
pub const ENV_SOURCE_URL: &str = "RELAY_SOURCE_URL";
/// Environment variable overriding [`RelayConfig::destination`]
pub const ENV_DESTINATION_URL: &str = "RELAY_DESTINATION_URL";
/// Environment variable overriding [`RelayConfig::object`]
pub const ENV_OBJECT: &str = "RELAY_OBJECT";
/// Environment variable overriding [`RelayConfig::interval_secs`]
pub const ENV_INTERVAL_SECS: &str = "RELAY_INTERVAL_SECS";
/// Environment variable overriding [`RelayConfig::proxy_url`]
pub const ENV_PROXY_URL: &str = "RELAY_PROXY_URL";

// ============================================================================
// Top-Level Relay Config
// ============================================================================

/// Complete relay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Store URL holding the CSV input
    #[serde(default)]
    pub source: String,

    /// Store URL receiving the Parquet output
    #[serde(default)]
    pub destination: String,

    /// Name of the input object converted on every tick
    #[serde(default)]
    pub object: String,

    /// Seconds between ticks (fractions allowed)
    #[serde(default = "default_interval_secs")]
    pub interval_secs: f64,

    /// Per-run deadline in seconds, 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Refuse inputs larger than this many bytes
    #[serde(default)]
    pub max_object_bytes: Option<u64>,

    /// HTTP proxy for cloud store clients
    #[serde(default)]
    pub proxy_url: Option<String>,

    /// CSV parsing options
    #[serde(default)]
    pub csv: SourceConfig,

    /// Parquet output options
    #[serde(default)]
    pub parquet: EncoderConfig,
}

fn default_interval_secs() -> f64 {
    5.0
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            source: String::new(),
            destination: String::new(),
            object: String::new(),
            interval_secs: default_interval_secs(),
            timeout_secs: default_timeout_secs(),
            max_object_bytes: None,
            proxy_url: None,
            csv: SourceConfig::default(),
            parquet: EncoderConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse a configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: RelayConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Apply `RELAY_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply `RELAY_*` overrides from `lookup`
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_SOURCE_URL) {
            self.source = url;
        }
        if let Some(url) = lookup(ENV_DESTINATION_URL) {
            self.destination = url;
        }
        if let Some(object) = lookup(ENV_OBJECT) {
            self.object = object;
        }
        if let Some(secs) = lookup(ENV_INTERVAL_SECS) {
            self.interval_secs = secs.trim().parse().map_err(|_| {
                Error::invalid_value(ENV_INTERVAL_SECS, format!("'{secs}' is not a number"))
            })?;
        }
        if let Some(proxy) = lookup(ENV_PROXY_URL) {
            self.proxy_url = proxy.none_if_empty();
        }
        Ok(())
    }

    /// Check required fields and value ranges
    pub fn validate(&self) -> Result<()> {
        if self.source.trim().is_empty() {
            return Err(Error::missing_field("source"));
        }
        if self.destination.trim().is_empty() {
            return Err(Error::missing_field("destination"));
        }
        if self.object.trim().is_empty() {
            return Err(Error::missing_field("object"));
        }
        match Duration::try_from_secs_f64(self.interval_secs) {
            Ok(interval) if interval >= MIN_INTERVAL => {}
            _ => {
                return Err(Error::invalid_value(
                    "interval_secs",
                    format!(
                        "must be between {}s and {}s, got {}",
                        MIN_INTERVAL.as_secs_f64(),
                        Duration::MAX.as_secs(),
                        self.interval_secs
                    ),
                ))
            }
        }
        if self.csv.delimiter_byte().is_none() {
            return Err(Error::invalid_value(
                "csv.delimiter",
                format!("{:?} is not a single ASCII character", self.csv.delimiter),
            ));
        }
        if self.parquet.batch_size == 0 {
            return Err(Error::invalid_value("parquet.batch_size", "must be at least 1"));
        }
        if self.parquet.row_group_size == 0 {
            return Err(Error::invalid_value(
                "parquet.row_group_size",
                "must be at least 1",
            ));
        }
        if self.max_object_bytes == Some(0) {
            return Err(Error::invalid_value("max_object_bytes", "must be at least 1"));
        }
        Ok(())
    }

    /// Tick interval, never shorter than [`MIN_INTERVAL`]
    ///
    /// Falls back to the default for values `validate` rejects.
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_secs)
            .map_or(DEFAULT_INTERVAL, |interval| interval.max(MIN_INTERVAL))
    }

    /// Per-run deadline, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    /// Options shared by both store clients
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            proxy_url: self.proxy_url.clone(),
        }
    }

    /// Open the source store
    pub fn source_store(&self) -> Result<Arc<ObjectBlobStore>> {
        ObjectBlobStore::parse(&self.source, &self.store_options()).map(Arc::new)
    }

    /// Open the destination store
    pub fn destination_store(&self) -> Result<Arc<ObjectBlobStore>> {
        ObjectBlobStore::parse(&self.destination, &self.store_options()).map(Arc::new)
    }
}
