//! Streaming row source module
//!
//! Parses CSV from an async byte stream into header-keyed rows.
//!
//! # Overview
//!
//! A [`RowSource`] is pulled one [`RowEvent`] at a time: the header row
//! first, then each data row in input order, then a single terminal event.
//! Error and end-of-input are ordinary events, so consumers never need
//! separate callbacks for them.

mod reader;
mod types;

pub use reader::{collect_events, RowSource};
pub use types::{RaggedRows, RowEvent, SourceConfig};
