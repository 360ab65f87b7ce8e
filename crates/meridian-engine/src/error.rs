//! Error types for engine operations

use meridian_gatekeeper::GatekeeperError;
use meridian_janitor::JanitorError;
use meridian_store::StoreError;
use thiserror::Error;

/// Errors that stop a run
///
/// Every variant is fatal: the run produces no report.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Corpus could not be opened
    #[error(transparent)]
    Open(#[from] StoreError),

    /// Corpus could not be read or written
    #[error("Corpus error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Schema registry problem
    #[error(transparent)]
    Schema(#[from] GatekeeperError),

    /// Repair could not complete
    #[error(transparent)]
    Repair(#[from] JanitorError),

    /// A repair pass produced more violations than it started with
    #[error("Repair increased the violation count from {before} to {after}")]
    NonMonotonic {
        /// Violations before repair
        before: usize,
        /// Violations after repair
        after: usize,
    },
}

impl EngineError {
    /// The store error behind a corpus failure, when the store is a YAML store
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            EngineError::Open(e) => Some(e),
            EngineError::Store(source) => source.downcast_ref::<StoreError>(),
            _ => None,
        }
    }

    /// Whether the run stopped while reading the corpus
    pub fn is_read_error(&self) -> bool {
        self.store_error().is_some_and(StoreError::is_read_error)
    }
}
