//! Storage error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// Every variant is fatal for a batch run.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Corpus root is missing or not a directory
    #[error("Corpus root {} is not a directory", .0.display())]
    InvalidRoot(PathBuf),

    /// A file or directory could not be read
    #[error("Corpus read error at {}: {source}", .path.display())]
    CorpusRead {
        /// Offending file or directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A file is not valid YAML
    #[error("Corpus parse error at {}: {source}", .path.display())]
    CorpusParse {
        /// Offending file
        path: PathBuf,
        /// Underlying parser error
        #[source]
        source: serde_yaml::Error,
    },

    /// A document could not be written
    #[error("Corpus write error at {}: {source}", .path.display())]
    CorpusWrite {
        /// Target file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A document could not be serialized
    #[error("Failed to encode document for {}: {source}", .path.display())]
    Encode {
        /// Target file
        path: PathBuf,
        /// Underlying serializer error
        #[source]
        source: serde_yaml::Error,
    },
}

impl StoreError {
    /// Whether the error happened while reading the corpus
    pub fn is_read_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidRoot(_) | StoreError::CorpusRead { .. } | StoreError::CorpusParse { .. }
        )
    }
}
