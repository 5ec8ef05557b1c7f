//! Columnar encoder module
//!
//! Serializes CSV rows into a Parquet file held in a [`BufferedSink`].
//!
//! # Overview
//!
//! - [`EncodeSession`] accepts rows one at a time, so an async row source can
//!   feed it without collecting the whole file first
//! - [`encode`] runs a session over an in-memory row sequence
//! - [`EncoderConfig`] controls batching, row groups and statistics
//!
//! Each row must carry every schema column and every value must coerce to
//! its column's type; the first violation aborts the encode.
//!
//! [`BufferedSink`]: crate::sink::BufferedSink

mod session;
mod writer;

pub use session::{encode, EncodeSession, EncodeSummary};
pub use writer::EncoderConfig;
