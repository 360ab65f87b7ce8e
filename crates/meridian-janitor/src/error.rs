//! Error types for Janitor operations

use thiserror::Error;

/// Errors that can occur during Janitor operations
#[derive(Error, Debug)]
pub enum JanitorError {
    /// Storage layer error (a failed save aborts the run)
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Worker pool could not be built
    #[error("Worker error: {0}")]
    Worker(String),
}
