//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CSV to Parquet relay
#[derive(Parser, Debug)]
#[command(name = "csv-parquet-relay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Relay configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Convert the configured object on a fixed interval until interrupted
    Run,

    /// Convert one object once; exits non-zero if the run fails
    Once {
        /// Input object name (defaults to the configured object)
        object: Option<String>,
    },

    /// Print the schema inferred from a local CSV file
    Infer {
        /// CSV file to sample
        file: PathBuf,

        /// Field delimiter (overrides the configured one)
        #[arg(short, long)]
        delimiter: Option<char>,
    },

    /// Validate the configuration and exit
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
