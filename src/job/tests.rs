//! Tests for the job runner

use super::*;
use crate::encode::EncoderConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::storage::{BlobReader, BlobStore, ObjectBlobStore};
use arrow::array::{Array, Float64Array, StringArray};
use async_trait::async_trait;
use bytes::Bytes;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::sync::{mpsc, Notify};

fn stores() -> (Arc<ObjectBlobStore>, Arc<ObjectBlobStore>) {
    (
        Arc::new(ObjectBlobStore::in_memory()),
        Arc::new(ObjectBlobStore::in_memory()),
    )
}

async fn put(store: &ObjectBlobStore, name: &str, body: &str) {
    store
        .store(name, Bytes::copy_from_slice(body.as_bytes()))
        .await
        .unwrap();
}

async fn read_all(store: &dyn BlobStore, name: &str) -> Vec<u8> {
    let mut reader = store.fetch(name).await.unwrap();
    let mut out = Vec::new();
    reader.read_to_end(&mut out).await.unwrap();
    out
}

fn runner(source: &Arc<ObjectBlobStore>, destination: &Arc<ObjectBlobStore>) -> JobRunner {
    JobRunner::new(source.clone(), destination.clone())
}

/// Store whose fetch waits until released
#[derive(Debug)]
struct GatedStore {
    inner: ObjectBlobStore,
    entered: Notify,
    release: Notify,
}

impl GatedStore {
    fn new() -> Self {
        Self {
            inner: ObjectBlobStore::in_memory(),
            entered: Notify::new(),
            release: Notify::new(),
        }
    }
}

#[async_trait]
impl BlobStore for GatedStore {
    async fn fetch(&self, name: &str) -> Result<BlobReader> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.fetch(name).await
    }

    async fn size(&self, name: &str) -> Result<u64> {
        self.inner.size(name).await
    }

    async fn store(&self, name: &str, data: Bytes) -> Result<()> {
        self.inner.store(name, data).await
    }

    fn describe(&self) -> String {
        "gated".to_string()
    }
}

/// Store whose fetch never completes
#[derive(Debug)]
struct StalledStore;

#[async_trait]
impl BlobStore for StalledStore {
    async fn fetch(&self, _name: &str) -> Result<BlobReader> {
        std::future::pending().await
    }

    async fn size(&self, _name: &str) -> Result<u64> {
        Ok(0)
    }

    async fn store(&self, _name: &str, _data: Bytes) -> Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "stalled".to_string()
    }
}

// ============================================================================
// State machine
// ============================================================================

#[test]
fn test_state_order() {
    let mut run = JobRun::new("blobName.csv");
    assert_eq!(run.output, "blobName.parquet");
    assert_eq!(run.state(), JobState::Idle);

    let visited: Vec<JobState> = (0..7).map(|_| run.advance()).collect();
    assert_eq!(
        visited,
        vec![
            JobState::Fetching,
            JobState::Parsing,
            JobState::InferringSchema,
            JobState::Encoding,
            JobState::Relocating,
            JobState::Succeeded,
            JobState::Succeeded,
        ]
    );
    assert!(run.state().is_terminal());
}

#[test]
fn test_fail_records_state_and_error() {
    let mut run = JobRun::new("a.csv");
    run.advance();
    run.advance();
    run.fail(Error::NoRows);

    assert_eq!(run.state(), JobState::Failed);
    assert_eq!(run.failed_in(), Some(JobState::Parsing));
    assert!(matches!(run.last_error().map(|e| &**e), Some(Error::NoRows)));

    // terminal states do not move
    run.fail(Error::NoData);
    run.advance();
    assert_eq!(run.state(), JobState::Failed);
    assert!(matches!(run.last_error().map(|e| &**e), Some(Error::NoRows)));
}

// ============================================================================
// Runs
// ============================================================================

#[tokio::test]
async fn test_run_converts_and_relocates() {
    let (source, destination) = stores();
    put(&source, "blobName.csv", "name,age\nAlice,30\nBob,25\n").await;

    let completion = runner(&source, &destination)
        .run("blobName.csv")
        .await
        .unwrap();

    assert!(completion.succeeded());
    assert_eq!(completion.output_name, "blobName.parquet");
    assert_eq!(completion.stats.rows, 2);
    assert_eq!(completion.stats.columns, 2);
    assert!(completion.error.is_none());

    let data = Bytes::from(read_all(destination.as_ref(), "blobName.parquet").await);
    assert_eq!(completion.stats.bytes, data.len());
    let batches: Vec<_> = ParquetRecordBatchReaderBuilder::try_new(data)
        .unwrap()
        .build()
        .unwrap()
        .collect::<std::result::Result<_, _>>()
        .unwrap();

    let batch = &batches[0];
    let names = batch
        .column(0)
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap();
    let ages = batch
        .column(1)
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap();
    assert_eq!(names.len(), 2);
    assert_eq!(names.value(0), "Alice");
    assert_eq!(names.value(1), "Bob");
    assert_eq!(ages.value(0), 30.0);
    assert_eq!(ages.value(1), 25.0);
}

#[tokio::test]
async fn test_header_only_input_fails_without_output() {
    let (source, destination) = stores();
    put(&source, "empty.csv", "name,age\n").await;

    let completion = runner(&source, &destination).run("empty.csv").await.unwrap();

    assert_eq!(completion.outcome, JobOutcome::Failed);
    assert_eq!(completion.failed_in, Some(JobState::Parsing));
    assert_eq!(completion.error_kind(), Some(ErrorKind::SchemaInference));
    assert!(matches!(completion.error.as_deref(), Some(Error::NoRows)));
    assert!(matches!(
        destination.fetch("empty.parquet").await,
        Err(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_type_mismatch_fails_in_encoding() {
    let (source, destination) = stores();
    put(
        &source,
        "events.csv",
        "id,created\n1,2024-01-01\n2,not-a-date\n",
    )
    .await;

    let completion = runner(&source, &destination)
        .run("events.csv")
        .await
        .unwrap();

    assert!(!completion.succeeded());
    assert_eq!(completion.failed_in, Some(JobState::Encoding));
    match completion.error.as_deref() {
        Some(Error::TypeMismatch {
            column, row_index, ..
        }) => {
            assert_eq!(column, "created");
            assert_eq!(*row_index, 1);
        }
        other => panic!("expected TypeMismatch, got {other:?}"),
    }
    assert!(destination.fetch("events.parquet").await.is_err());
}

#[tokio::test]
async fn test_failure_leaves_prior_output_untouched() {
    let (source, destination) = stores();
    put(&destination, "data.parquet", "previous").await;
    put(&source, "data.csv", "a,b\n1,2\nx,3\n").await;

    let completion = runner(&source, &destination).run("data.csv").await.unwrap();

    assert!(!completion.succeeded());
    assert_eq!(
        read_all(destination.as_ref(), "data.parquet").await,
        b"previous"
    );
}

#[tokio::test]
async fn test_missing_input_fails_in_fetching() {
    let (source, destination) = stores();

    let completion = runner(&source, &destination)
        .run("missing.csv")
        .await
        .unwrap();

    assert_eq!(completion.failed_in, Some(JobState::Fetching));
    assert_eq!(completion.error_kind(), Some(ErrorKind::Fetch));
    assert!(matches!(
        completion.error.as_deref(),
        Some(Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_object_size_limit() {
    let (source, destination) = stores();
    put(&source, "big.csv", "a\n1\n2\n3\n").await;

    let completion = runner(&source, &destination)
        .with_max_object_bytes(Some(4))
        .run("big.csv")
        .await
        .unwrap();

    assert!(matches!(
        completion.error.as_deref(),
        Some(Error::ObjectTooLarge {
            size: 8,
            limit: 4,
            ..
        })
    ));
}

#[tokio::test]
async fn test_output_replaced_on_success() {
    let (source, destination) = stores();
    put(&destination, "r.parquet", "stale").await;
    put(&source, "r.csv", "k\nv\n").await;

    let runner = runner(&source, &destination)
        .with_encoder_config(EncoderConfig::new().uncompressed());
    assert!(runner.run("r.csv").await.unwrap().succeeded());

    let data = read_all(destination.as_ref(), "r.parquet").await;
    assert_eq!(&data[..4], b"PAR1");
}

// ============================================================================
// Completion signal
// ============================================================================

#[tokio::test]
async fn test_completion_sent_for_each_run() {
    let (source, destination) = stores();
    put(&source, "ok.csv", "a\n1\n").await;
    let (tx, mut rx) = mpsc::unbounded_channel();

    let runner = runner(&source, &destination).with_completions(tx);
    runner.run("ok.csv").await.unwrap();
    runner.run("gone.csv").await.unwrap();

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first.object_name, "ok.csv");
    assert!(first.succeeded());
    assert_eq!(second.object_name, "gone.csv");
    assert!(!second.succeeded());
}

// ============================================================================
// Concurrency and deadlines
// ============================================================================

#[tokio::test]
async fn test_overlapping_trigger_is_skipped() {
    let source = Arc::new(GatedStore::new());
    source
        .store("slow.csv", Bytes::from_static(b"a\n1\n"))
        .await
        .unwrap();
    let destination = Arc::new(ObjectBlobStore::in_memory());
    let runner = JobRunner::new(source.clone(), destination);

    let first = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.run("slow.csv").await })
    };
    source.entered.notified().await;
    assert_eq!(runner.in_flight(), 1);

    assert!(runner.run("slow.csv").await.is_none());

    source.release.notify_one();
    let completion = first.await.unwrap().unwrap();
    assert!(completion.succeeded());
    assert_eq!(runner.in_flight(), 0);

    // the slot is free again; a later trigger runs
    let again = {
        let runner = runner.clone();
        tokio::spawn(async move { runner.run("slow.csv").await })
    };
    source.entered.notified().await;
    source.release.notify_one();
    assert!(again.await.unwrap().is_some());
}

#[tokio::test]
async fn test_run_times_out() {
    let runner = JobRunner::new(
        Arc::new(StalledStore),
        Arc::new(ObjectBlobStore::in_memory()),
    )
    .with_timeout(Some(Duration::from_millis(20)));

    let completion = runner.run("stuck.csv").await.unwrap();

    assert_eq!(completion.failed_in, Some(JobState::Fetching));
    assert_eq!(completion.error_kind(), Some(ErrorKind::Timeout));
    assert!(completion.error.as_ref().unwrap().is_retryable());
    assert_eq!(runner.in_flight(), 0);
}
