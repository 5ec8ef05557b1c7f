//! CLI module
//!
//! Command-line interface for the relay.
//!
//! # Commands
//!
//! - `run` - Convert the configured object on every tick until a signal
//! - `once` - Convert one object and report the outcome
//! - `infer` - Print the schema inferred from a local CSV file
//! - `validate` - Check the configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::Runner;
