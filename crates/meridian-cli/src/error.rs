//! Error types for the CLI application.

use meridian_engine::{EngineError, ExitStatus};
use meridian_gatekeeper::GatekeeperError;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Engine error (corpus I/O, parse, or repair failure)
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// Schema definition error
    #[error("Schema error: {0}")]
    Schema(#[from] GatekeeperError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Process exit code for this error
    ///
    /// Bad invocations share the argument parser's usage code (2); anything
    /// that stopped the tool from running is fatal (3).
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) | CliError::Toml(_) | CliError::InvalidInput(_) => 2,
            _ => ExitStatus::Fatal.code(),
        }
    }
}
