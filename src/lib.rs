// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # CSV to Parquet relay
//!
//! Periodically converts a CSV object held in one blob store into a Parquet
//! object in another.
//!
//! ## Features
//!
//! - **Streaming CSV parsing**: pull-based row events over any async byte stream
//! - **Schema inference**: numeric, timestamp and string columns from the first row
//! - **Parquet encoding**: PLAIN-encoded, per-column compression, in memory
//! - **Blob stores**: Azure, S3, R2, GCS, local filesystem and memory via `object_store`
//! - **Scheduling**: fixed-interval runs with single-flight and a run deadline
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use csv_parquet_relay::{JobRunner, ObjectBlobStore, StoreOptions};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> csv_parquet_relay::Result<()> {
//!     let options = StoreOptions::default();
//!     let source = ObjectBlobStore::parse("az://incoming/csv", &options)?;
//!     let destination = ObjectBlobStore::parse("az://converted/parquet", &options)?;
//!
//!     let runner = JobRunner::new(Arc::new(source), Arc::new(destination));
//!     if let Some(completion) = runner.run("blobName.csv").await {
//!         println!("{} -> {}: {:?}", completion.object_name, completion.output_name, completion.outcome);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐ fetch ┌───────────┐ rows ┌──────────┐ push ┌──────────┐
//! │ source     │──────▶│ RowSource │─────▶│ Schema   │─────▶│ Encode   │
//! │ BlobStore  │       │ (csv)     │      │ Inferrer │      │ Session  │
//! └────────────┘       └───────────┘      └──────────┘      └────┬─────┘
//!                                                                │ bytes
//! ┌────────────┐ store ┌───────────┐                        ┌────▼─────┐
//! │ destination│◀──────│ JobRunner │◀───────────────────────│ Buffered │
//! │ BlobStore  │       │           │        finalize        │ Sink     │
//! └────────────┘       └─────▲─────┘                        └──────────┘
//!                            │ tick
//!                      ┌─────┴─────┐
//!                      │ Scheduler │
//!                      └───────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the relay
pub mod error;

/// Common types and type aliases
pub mod types;

/// In-memory output buffer
pub mod sink;

/// Schema inference from a sample row
pub mod schema;

/// Streaming CSV row source
pub mod source;

/// Parquet encoding
pub mod encode;

/// Blob stores and output naming
pub mod storage;

/// Conversion job runner
pub mod job;

/// Fixed-interval trigger
pub mod scheduler;

/// Relay configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorKind, Result};
pub use types::*;

// Re-export commonly used types
pub use config::RelayConfig;
pub use encode::{encode, EncodeSession, EncodeSummary, EncoderConfig};
pub use job::{ConversionStats, JobCompletion, JobOutcome, JobRunner, JobState};
pub use scheduler::{shutdown_signal, Scheduler, SchedulerSummary};
pub use schema::{infer_schema, ColumnDescriptor, Schema, SchemaInferrer};
pub use sink::BufferedSink;
pub use source::{RaggedRows, RowEvent, RowSource, SourceConfig};
pub use storage::{output_name, BlobReader, BlobStore, ObjectBlobStore, StoreOptions};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
