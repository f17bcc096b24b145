//! CLI-specific error types and exit code mapping

use advisory_core::error::AdvisoryError;
use advisory_schema::SchemaError;

/// CLI error type.
///
/// `exit_code()` maps each variant to the process exit status.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// One or more documents failed to load or validate.
    #[error("{0} document(s) failed validation")]
    InvalidDocuments(usize),

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped error from advisory-core.
    #[error("{0}")]
    Core(#[from] AdvisoryError),

    /// Document loading or decoding error.
    #[error("{0}")]
    Schema(#[from] SchemaError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                     |
    /// |------|-----------------------------|
    /// | 0    | Success                     |
    /// | 1    | General / command error     |
    /// | 2    | Configuration error         |
    /// | 3    | Invalid advisory documents  |
    /// | 10   | IO error                    |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_)
            | Self::Core(AdvisoryError::Config(_))
            | Self::Schema(SchemaError::Config { .. }) => 2,
            Self::InvalidDocuments(_) => 3,
            Self::Io(_) | Self::Core(AdvisoryError::Io(_)) | Self::Schema(SchemaError::Io { .. }) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) | Self::Schema(_) => 1,
        }
    }
}
