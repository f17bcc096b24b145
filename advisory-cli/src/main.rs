//! advisory CLI -- validate and query security advisory documents.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

use advisory_core::config::AdvisoryConfig;
use advisory_core::error::{AdvisoryError, ConfigError};
use advisory_schema::SchemaConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // `config` reports its own load failures, so fall back to defaults for logging.
    let loaded = load_config(&cli.config).await;
    let mut general = loaded
        .as_ref()
        .map(|(config, _)| config.general.clone())
        .unwrap_or_default();
    if let Some(level) = &cli.log_level {
        general.log_level = level.clone();
    }
    if let Err(e) = logging::init_tracing(&general) {
        eprintln!("warning: {e}");
    }

    match run(cli, loaded).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            // exit codes are all within 0..=255
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(
    cli: Cli,
    loaded: Result<(AdvisoryConfig, bool), CliError>,
) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Config(args) => commands::config::execute(args, &cli.config, &writer).await,
        Commands::Validate(args) => {
            let schema = schema_config(loaded?, &cli.config)?;
            commands::validate::execute(args, schema, &writer).await
        }
        Commands::Query(args) => {
            let schema = schema_config(loaded?, &cli.config)?;
            commands::query::execute(args, schema, &writer).await
        }
    }
}

/// Load `advisory.toml`; a missing file yields defaults with env overrides.
///
/// The flag is `true` when the defaults were used.
async fn load_config(path: &Path) -> Result<(AdvisoryConfig, bool), CliError> {
    match AdvisoryConfig::load(path).await {
        Ok(config) => Ok((config, false)),
        Err(AdvisoryError::Config(ConfigError::FileNotFound { .. })) => {
            let mut config = AdvisoryConfig::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok((config, true))
        }
        Err(e) => Err(e.into()),
    }
}

fn schema_config(
    (config, defaulted): (AdvisoryConfig, bool),
    path: &Path,
) -> Result<SchemaConfig, CliError> {
    if defaulted {
        debug!(path = %path.display(), "config file not found, using defaults");
    }
    let schema = SchemaConfig::from_core(&config.schema);
    schema.validate()?;
    Ok(schema)
}
