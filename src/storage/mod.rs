//! Storage module
//!
//! The blob store collaborator the job runner fetches input from and stores
//! output to.
//!
//! # Overview
//!
//! - [`BlobStore`] - fetch/store contract used by the job runner
//! - [`ObjectBlobStore`] - implementation over `object_store`, parsed from a URL
//! - [`output_name`] - derives `name.parquet` from `name.csv`

mod naming;
mod object;
mod store;

pub use naming::{output_name, SOURCE_SUFFIX, TARGET_SUFFIX};
pub use object::{ObjectBlobStore, StoreOptions};
pub use store::{BlobReader, BlobStore};
