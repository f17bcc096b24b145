//! CLI argument parsing using clap derive API
//!
//! Purely declarative; no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// advisory -- validate and query security advisory documents.
///
/// Use `advisory <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "advisory", version, about, long_about = None)]
pub struct Cli {
    /// Path to the advisory.toml configuration file.
    ///
    /// A missing file is not an error; defaults plus environment overrides are used.
    #[arg(short, long, default_value = "advisory.toml")]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate advisory documents.
    Validate(ValidateArgs),

    /// Look up an advisory by vulnerability ID.
    Query(QueryArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- validate ----

/// Validate advisory document files or directories of them.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Document files or directories (directories are scanned non-recursively).
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

// ---- query ----

/// Find the advisory in a document that references a vulnerability.
#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Advisory document to search.
    pub file: PathBuf,

    /// Vulnerability IDs (advisory IDs or aliases); the first match wins.
    #[arg(required = true)]
    pub vuln_ids: Vec<String>,

    /// Match only advisory IDs, using the first given ID.
    #[arg(long)]
    pub exact: bool,
}

// ---- config ----

/// Manage advisory configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, schema).
        #[arg(long)]
        section: Option<String>,
    },
}
