//! Job runner module
//!
//! One conversion run end-to-end: fetch the CSV object, parse it, infer a
//! schema from the first row, encode to Parquet in memory, and store the
//! result under the derived name.
//!
//! # States
//!
//! ```text
//! Idle → Fetching → Parsing → InferringSchema → Encoding → Relocating → Succeeded
//!   └──────────┴─────────┴──────────┴───────────────┴───────────┴──→ Failed
//! ```
//!
//! Every failure ends the run in `Failed` and is reported through a
//! [`JobCompletion`]; nothing is stored unless encoding finished.

mod flight;
mod runner;
mod types;

pub use runner::{JobRunner, DEFAULT_RUN_TIMEOUT};
pub use types::{ConversionStats, JobCompletion, JobOutcome, JobRun, JobState};

#[cfg(test)]
mod tests;
