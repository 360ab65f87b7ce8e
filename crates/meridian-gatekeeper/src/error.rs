//! Gatekeeper error types

use meridian_domain::Domain;
use thiserror::Error;

/// Errors that can occur during gatekeeper operations
#[derive(Error, Debug)]
pub enum GatekeeperError {
    /// Schema definition is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema definition could not be read
    #[error("Failed to read schema definition: {0}")]
    Io(#[from] std::io::Error),

    /// Schema definition is not valid TOML
    #[error("Failed to parse schema definition: {0}")]
    Toml(#[from] toml::de::Error),

    /// No schema is registered for a domain that has documents
    #[error("No schema registered for domain '{0}'")]
    UnknownDomain(Domain),
}
