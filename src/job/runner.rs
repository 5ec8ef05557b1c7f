//! Job runner: fetch, infer, encode, relocate

use super::flight::InFlight;
use super::types::{ConversionStats, JobCompletion, JobOutcome, JobRun, JobState};
use crate::config::RelayConfig;
use crate::encode::{EncodeSession, EncoderConfig};
use crate::error::{Error, Result};
use crate::schema::SchemaInferrer;
use crate::sink::BufferedSink;
use crate::source::{RowEvent, RowSource, SourceConfig};
use crate::storage::BlobStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Default deadline for a single run
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Orchestrates conversion runs between a source and a destination store
#[derive(Debug, Clone)]
pub struct JobRunner {
    /// Store the CSV input is read from
    source: Arc<dyn BlobStore>,
    /// Store the Parquet output is written to
    destination: Arc<dyn BlobStore>,
    inferrer: SchemaInferrer,
    source_config: SourceConfig,
    encoder_config: EncoderConfig,
    /// Deadline per run, `None` to wait forever
    timeout: Option<Duration>,
    /// Refuse inputs larger than this
    max_object_bytes: Option<u64>,
    completions: Option<mpsc::UnboundedSender<JobCompletion>>,
    in_flight: InFlight,
}

impl JobRunner {
    /// Create a runner with default settings
    pub fn new(source: Arc<dyn BlobStore>, destination: Arc<dyn BlobStore>) -> Self {
        Self {
            source,
            destination,
            inferrer: SchemaInferrer::new(),
            source_config: SourceConfig::default(),
            encoder_config: EncoderConfig::default(),
            timeout: Some(DEFAULT_RUN_TIMEOUT),
            max_object_bytes: None,
            completions: None,
            in_flight: InFlight::default(),
        }
    }

    /// Build a runner from a validated configuration, opening both stores
    pub fn from_config(config: &RelayConfig) -> Result<Self> {
        Ok(Self::new(config.source_store()?, config.destination_store()?)
            .with_source_config(config.csv.clone())
            .with_encoder_config(config.parquet.clone())
            .with_timeout(config.timeout())
            .with_max_object_bytes(config.max_object_bytes))
    }

    /// Set CSV parsing options
    #[must_use]
    pub fn with_source_config(mut self, config: SourceConfig) -> Self {
        self.source_config = config;
        self
    }

    /// Set encoder options; the compression codec also applies to inference
    #[must_use]
    pub fn with_encoder_config(mut self, config: EncoderConfig) -> Self {
        self.inferrer = self.inferrer.with_compression(config.compression);
        self.encoder_config = config;
        self
    }

    /// Set the per-run deadline
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Refuse input objects larger than `limit` bytes
    #[must_use]
    pub fn with_max_object_bytes(mut self, limit: Option<u64>) -> Self {
        self.max_object_bytes = limit;
        self
    }

    /// Send every completion to `tx`
    #[must_use]
    pub fn with_completions(mut self, tx: mpsc::UnboundedSender<JobCompletion>) -> Self {
        self.completions = Some(tx);
        self
    }

    /// Number of runs currently in progress
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Run one conversion of `object_name`
    ///
    /// Returns `None` without doing anything when a run for the same object
    /// is still in progress. Failures never escape: they end the run in
    /// `Failed` and are reported through the completion.
    pub async fn run(&self, object_name: &str) -> Option<JobCompletion> {
        let Some(_guard) = self.in_flight.acquire(object_name) else {
            warn!(object = %object_name, "previous run still in flight, skipping trigger");
            return None;
        };

        let started = Instant::now();
        let mut run = JobRun::new(object_name);

        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.execute(&mut run))
                .await
                .unwrap_or_else(|_| {
                    Err(Error::Timeout {
                        timeout_ms: limit.as_millis() as u64,
                    })
                }),
            None => self.execute(&mut run).await,
        };

        let stats = match result {
            Ok(stats) => {
                run.advance();
                stats
            }
            Err(e) => {
                run.fail(e);
                ConversionStats::default()
            }
        };

        let completion = JobCompletion::from_run(run, stats, started.elapsed());
        self.emit(&completion);
        Some(completion)
    }

    /// Drive `run` from `Idle` to `Relocating`, storing the output
    async fn execute(&self, run: &mut JobRun) -> Result<ConversionStats> {
        run.advance(); // Fetching
        if let Some(limit) = self.max_object_bytes {
            let size = self.source.size(&run.input).await?;
            if size > limit {
                return Err(Error::ObjectTooLarge {
                    name: run.input.clone(),
                    size,
                    limit,
                });
            }
        }
        let reader = self.source.fetch(&run.input).await?;

        run.advance(); // Parsing
        let mut rows = RowSource::new(reader, &self.source_config)?.with_name(&run.input);
        let headers = match rows.next_event().await {
            Some(RowEvent::Headers(headers)) => headers,
            Some(RowEvent::Error(e)) => return Err(e),
            _ => return Err(Error::csv("input ended before the header row")),
        };
        let sample = match rows.next_event().await {
            Some(RowEvent::Row(row)) => row,
            Some(RowEvent::Error(e)) => return Err(e),
            Some(RowEvent::Headers(_)) => return Err(Error::csv("unexpected second header row")),
            Some(RowEvent::End) | None => return Err(Error::NoRows),
        };

        run.advance(); // InferringSchema
        let schema = self.inferrer.infer(&headers, &sample)?;
        debug!(
            object = %run.input,
            columns = schema.len(),
            schema = %schema.to_json_pretty(),
            "schema inferred"
        );

        run.advance(); // Encoding
        let mut sink = BufferedSink::new();
        let summary = {
            let mut session = EncodeSession::new(&schema, &mut sink, &self.encoder_config);
            session.push(&sample)?;
            loop {
                match rows.next_event().await {
                    Some(RowEvent::Row(row)) => session.push(&row)?,
                    Some(RowEvent::End) | None => break,
                    Some(RowEvent::Error(e)) => return Err(e),
                    Some(RowEvent::Headers(_)) => {
                        return Err(Error::csv("unexpected second header row"))
                    }
                }
            }
            session.finish()?
        };

        run.advance(); // Relocating
        let data = sink.finalize();
        let stats = ConversionStats {
            rows: summary.rows,
            bytes: data.len(),
            columns: schema.len(),
        };
        self.destination.store(&run.output, data).await?;

        debug_assert_eq!(run.state(), JobState::Relocating);
        Ok(stats)
    }

    /// Publish a completion to the log and the completion channel
    fn emit(&self, completion: &JobCompletion) {
        let elapsed_ms = completion.elapsed.as_millis() as u64;
        match (&completion.outcome, &completion.error) {
            (JobOutcome::Succeeded, _) => info!(
                object = %completion.object_name,
                output = %completion.output_name,
                destination = %self.destination.describe(),
                rows = completion.stats.rows,
                bytes = completion.stats.bytes,
                elapsed_ms,
                "conversion succeeded"
            ),
            (JobOutcome::Failed, err) => {
                let kind = completion
                    .error_kind()
                    .map(|k| k.to_string())
                    .unwrap_or_default();
                let message = err.as_ref().map(ToString::to_string).unwrap_or_default();
                let retryable = err.as_ref().is_some_and(|e| e.is_retryable());
                error!(
                    object = %completion.object_name,
                    state = ?completion.failed_in,
                    kind = %kind,
                    retryable,
                    elapsed_ms,
                    error = %message,
                    "conversion failed"
                );
            }
        }

        if let Some(tx) = &self.completions {
            if tx.send(completion.clone()).is_err() {
                debug!("completion receiver dropped");
            }
        }
    }
}
