//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::RelayConfig;
use crate::error::{Error, Result};
use crate::job::{JobCompletion, JobRunner};
use crate::scheduler::{shutdown_signal, Scheduler};
use crate::schema::{Schema, SchemaInferrer};
use crate::source::{RowEvent, RowSource, SourceConfig};
use crate::types::Compression;
use serde_json::{json, Value};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run => self.run_scheduler().await,
            Commands::Once { object } => self.once(object.as_deref()).await,
            Commands::Infer { file, delimiter } => self.infer(file, *delimiter).await,
            Commands::Validate => self.validate(),
        }
    }

    /// Load the configuration file (if any) and apply environment overrides
    fn load_config(&self) -> Result<RelayConfig> {
        let mut config = match &self.cli.config {
            Some(path) => RelayConfig::from_file(path)?,
            None => RelayConfig::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Run the scheduler until SIGINT/SIGTERM
    async fn run_scheduler(&self) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;

        let runner = JobRunner::from_config(&config)?;
        let scheduler = Scheduler::new(runner, &config.object).with_interval(config.interval());

        let shutdown = CancellationToken::new();
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            signal_token.cancel();
        });

        info!(
            source = %config.source,
            destination = %config.destination,
            object = %config.object,
            "relay starting"
        );
        let summary = scheduler.run(shutdown).await;

        self.output_message(&json!({
            "type": "SUMMARY",
            "ticks": summary.ticks,
            "completed": summary.completed,
            "skipped": summary.skipped,
        }));
        Ok(())
    }

    /// Convert one object and report the completion
    async fn once(&self, object: Option<&str>) -> Result<()> {
        let mut config = self.load_config()?;
        if let Some(object) = object {
            config.object = object.to_string();
        }
        config.validate()?;

        let runner = JobRunner::from_config(&config)?;
        let completion = runner
            .run(&config.object)
            .await
            .ok_or_else(|| Error::Other(format!("run for '{}' was skipped", config.object)))?;

        self.output_message(&completion_message(&completion));

        match &completion.error {
            None => Ok(()),
            Some(e) => Err(Error::Other(format!(
                "conversion of '{}' failed: {e}",
                completion.object_name
            ))),
        }
    }

    /// Infer and print the schema of a local CSV file
    ///
    /// Parsing options and compression come from `--config` when given, so
    /// the result matches what a run would infer.
    async fn infer(&self, file: &Path, delimiter: Option<char>) -> Result<()> {
        let config = match &self.cli.config {
            Some(_) => Some(self.load_config()?),
            None => None,
        };
        let (source_config, inferrer) = infer_settings(config.as_ref(), delimiter);
        let schema = infer_file(file, &source_config, &inferrer).await?;
        self.output_message(&json!({
            "type": "SCHEMA",
            "file": file.display().to_string(),
            "schema": serde_json::to_value(&schema)?,
        }));
        Ok(())
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        config.validate()?;
        self.output_message(&json!({
            "type": "VALIDATION",
            "valid": true,
            "source": config.source,
            "destination": config.destination,
            "object": config.object,
        }));
        Ok(())
    }

    /// Output a message in the selected format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Parsing options and inferrer for `infer`, as a run with `config` would use them
pub(crate) fn infer_settings(
    config: Option<&RelayConfig>,
    delimiter: Option<char>,
) -> (SourceConfig, SchemaInferrer) {
    let (mut source_config, compression) = match config {
        Some(config) => (config.csv.clone(), config.parquet.compression),
        None => (SourceConfig::default(), Compression::default()),
    };
    if let Some(delimiter) = delimiter {
        source_config.delimiter = delimiter;
    }
    (
        source_config,
        SchemaInferrer::new().with_compression(compression),
    )
}

/// Infer the schema of a local CSV file from its header and first row
pub(crate) async fn infer_file(
    file: &Path,
    config: &SourceConfig,
    inferrer: &SchemaInferrer,
) -> Result<Schema> {
    let handle = tokio::fs::File::open(file).await?;
    let mut rows = RowSource::new(handle, config)?.with_name(file.display().to_string());

    let headers = match rows.next_event().await {
        Some(RowEvent::Headers(headers)) => headers,
        Some(RowEvent::Error(e)) => return Err(e),
        _ => return Err(Error::csv("input ended before the header row")),
    };
    match rows.next_event().await {
        Some(RowEvent::Row(sample)) => inferrer.infer(&headers, &sample),
        Some(RowEvent::Error(e)) => Err(e),
        _ => Err(Error::NoRows),
    }
}

/// JSON message describing a completion
pub(crate) fn completion_message(completion: &JobCompletion) -> Value {
    json!({
        "type": "COMPLETION",
        "object": completion.object_name,
        "output": completion.output_name,
        "succeeded": completion.succeeded(),
        "failed_in": completion.failed_in.map(|s| s.to_string()),
        "error_kind": completion.error_kind(),
        "error": completion.error.as_ref().map(ToString::to_string),
        "rows": completion.stats.rows,
        "bytes": completion.stats.bytes,
        "elapsed_ms": completion.elapsed.as_millis() as u64,
    })
}
