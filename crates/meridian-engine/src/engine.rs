//! Batch operations over a corpus

use crate::{CompletenessTable, EngineError, Report};
use meridian_domain::{DocumentStore, Domain};
use meridian_gatekeeper::{Corpus, Gatekeeper, SchemaRegistry, ValidationConfig, ValidationPass};
use meridian_janitor::{Janitor, RepairConfig, RepairResult};
use meridian_store::YamlStore;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// Which part of the corpus an operation covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scope {
    /// Every domain
    #[default]
    All,
    /// One domain
    Domain(Domain),
}

impl Scope {
    /// The single domain in scope, if any
    pub fn domain(&self) -> Option<Domain> {
        match self {
            Scope::All => None,
            Scope::Domain(domain) => Some(*domain),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "all"),
            Scope::Domain(domain) => write!(f, "{}", domain),
        }
    }
}

impl std::str::FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Scope::All);
        }
        s.parse::<Domain>().map(Scope::Domain)
    }
}

impl Serialize for Scope {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What a repair run did, with the corpus state on both sides
#[derive(Debug, Clone, Serialize)]
pub struct RepairOutcome {
    /// Repair counts and the slug review log
    pub result: RepairResult,

    /// Validation before repair
    pub before: Report,

    /// Validation after repair (equal to `before` in a dry run)
    pub after: Report,

    /// Whether another repair pass would change nothing
    pub fixed_point: bool,
}

/// Runs validation, repair and scoring against one document store
///
/// The entity index always covers every domain, so cross-domain references
/// resolve even when the operation is scoped to a single domain.
pub struct Engine<S> {
    store: S,
    gatekeeper: Gatekeeper,
    repair_config: RepairConfig,
}

impl Engine<YamlStore> {
    /// Open a YAML corpus directory
    ///
    /// # Errors
    /// Fails if `root` is not a directory.
    pub fn open(root: impl AsRef<Path>, registry: SchemaRegistry) -> Result<Self, EngineError> {
        let store = YamlStore::open(root)?;
        Ok(Self::new(store, registry))
    }
}

impl<S> Engine<S>
where
    S: DocumentStore + Sync,
    S::Error: std::error::Error + Send + Sync + 'static,
{
    /// Create an engine over a store with default validation and repair settings
    pub fn new(store: S, registry: SchemaRegistry) -> Self {
        Self {
            store,
            gatekeeper: Gatekeeper::new(registry, ValidationConfig::default()),
            repair_config: RepairConfig::default(),
        }
    }

    /// Replace the validation settings
    pub fn with_validation_config(self, config: ValidationConfig) -> Self {
        let registry = self.gatekeeper.registry().clone();
        Self {
            gatekeeper: Gatekeeper::new(registry, config),
            ..self
        }
    }

    /// Replace the repair settings
    pub fn with_repair_config(mut self, config: RepairConfig) -> Self {
        self.repair_config = config;
        self
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load every domain into a fresh snapshot
    pub fn load(&self) -> Result<Corpus, EngineError> {
        Corpus::load(&self.store, &Domain::ALL).map_err(|e| EngineError::Store(Box::new(e)))
    }

    /// `validate(domain|all)`: check the corpus and aggregate the findings
    pub fn validate(&self, scope: Scope) -> Result<Report, EngineError> {
        let corpus = self.load()?;
        let pass = self.gatekeeper.validate(&corpus, scope.domain())?;
        Ok(Report::from_pass(scope, &pass))
    }

    /// `score(domain|all)`: field coverage and per-document confidence
    pub fn score(&self, scope: Scope) -> Result<CompletenessTable, EngineError> {
        let corpus = self.load()?;
        let pass = self.gatekeeper.validate(&corpus, scope.domain())?;
        Ok(CompletenessTable::from_pass(&pass))
    }

    /// `repair(domain|all, dry_run)`: fix what can be fixed, then re-validate
    ///
    /// # Errors
    /// Fails on any store error, and with [`EngineError::NonMonotonic`] if the
    /// re-validated corpus has more violations than before.
    pub fn repair(&self, scope: Scope, dry_run: bool) -> Result<RepairOutcome, EngineError> {
        let corpus = self.load()?;
        let before_pass = self.gatekeeper.validate(&corpus, scope.domain())?;
        let before = Report::from_pass(scope, &before_pass);

        let janitor = Janitor::new(RepairConfig {
            dry_run,
            ..self.repair_config.clone()
        });
        let result = janitor.repair(&self.store, corpus.documents(), &before_pass.violations)?;

        if dry_run {
            let fixed_point = result.is_noop();
            return Ok(RepairOutcome {
                result,
                after: before.clone(),
                before,
                fixed_point,
            });
        }

        let corpus = self.load()?;
        let after_pass = self.gatekeeper.validate(&corpus, scope.domain())?;
        if after_pass.violations.len() > before_pass.violations.len() {
            return Err(EngineError::NonMonotonic {
                before: before_pass.violations.len(),
                after: after_pass.violations.len(),
            });
        }

        let fixed_point = self.converged(&corpus, &after_pass)?;
        if !fixed_point {
            tracing::warn!("Repair did not reach a fixed point; another pass would change documents");
        }

        Ok(RepairOutcome {
            result,
            before,
            after: Report::from_pass(scope, &after_pass),
            fixed_point,
        })
    }

    /// Whether a dry-run repair of `pass` would change anything
    fn converged(&self, corpus: &Corpus, pass: &ValidationPass) -> Result<bool, EngineError> {
        let janitor = Janitor::new(RepairConfig {
            dry_run: true,
            ..self.repair_config.clone()
        });
        let probe = janitor.repair(&self.store, corpus.documents(), &pass.violations)?;
        Ok(probe.is_noop())
    }
}
