//! Command implementations.

pub mod repair;
pub mod score;
pub mod validate;

pub use self::repair::execute_repair;
pub use self::score::execute_score;
pub use self::validate::execute_validate;

use crate::cli::ThresholdArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use meridian_engine::{Engine, SeverityThresholds};
use meridian_gatekeeper::SchemaRegistry;
use meridian_store::YamlStore;
use std::path::PathBuf;

/// Settings shared by every command, after flags are merged over the config file.
#[derive(Debug, Clone)]
pub struct Context {
    /// Corpus root directory
    pub corpus: PathBuf,
    /// Schema definition file, `None` for the built-in schemas
    pub schema: Option<PathBuf>,
    /// Thresholds from the config file
    pub thresholds: SeverityThresholds,
    /// Repair worker threads from the config file
    pub workers: usize,
}

impl Context {
    /// Merge command-line values over the config file.
    pub fn resolve(corpus: Option<PathBuf>, schema: Option<PathBuf>, config: &Config) -> Result<Self> {
        let corpus = corpus
            .or_else(|| config.defaults.corpus.clone())
            .ok_or_else(|| {
                CliError::InvalidInput(
                    "No corpus given; pass --corpus, set MERIDIAN_CORPUS or [defaults] corpus".to_string(),
                )
            })?;

        Ok(Self {
            corpus,
            schema: schema.or_else(|| config.defaults.schema.clone()),
            thresholds: SeverityThresholds {
                max_critical: config.defaults.max_critical,
                max_high: config.defaults.max_high,
            },
            workers: config.defaults.workers,
        })
    }

    /// Load the schema registry.
    pub fn registry(&self) -> Result<SchemaRegistry> {
        match &self.schema {
            Some(path) => {
                tracing::debug!("Loading schemas from {}", path.display());
                Ok(SchemaRegistry::from_file(path)?)
            }
            None => Ok(SchemaRegistry::builtin()),
        }
    }

    /// Open the corpus.
    pub fn engine(&self) -> Result<Engine<YamlStore>> {
        let registry = self.registry()?;
        tracing::info!("Opening corpus at {}", self.corpus.display());
        Ok(Engine::open(&self.corpus, registry)?)
    }

    /// Thresholds with any flag overrides applied.
    pub fn thresholds(&self, args: &ThresholdArgs) -> SeverityThresholds {
        SeverityThresholds {
            max_critical: args.max_critical.unwrap_or(self.thresholds.max_critical),
            max_high: args.max_high.unwrap_or(self.thresholds.max_high),
        }
    }
}
