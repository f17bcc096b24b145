//! Command handlers -- one module per subcommand

pub mod config;
pub mod query;
pub mod validate;
