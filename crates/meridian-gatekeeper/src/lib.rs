//! Meridian Gatekeeper
//!
//! Validates corpus documents against their schema and against each other.
//!
//! The Gatekeeper provides:
//! - **Schema Registry**: per-domain, per-version field requirement tables with
//!   camelCase/snake_case alias resolution
//! - **Relationship Linker**: slug/URL agreement and cross-domain reference resolution
//! - **Completeness Scorer**: field coverage per domain and a 0-100 confidence
//!   score per document
//! - **Validation pass**: runs all of the above over a loaded [`Corpus`]
//!
//! # Examples
//!
//! ```no_run
//! use meridian_gatekeeper::{Corpus, Gatekeeper, SchemaRegistry, ValidationConfig};
//! use meridian_store::YamlStore;
//! use meridian_domain::Domain;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = YamlStore::open("content")?;
//! let corpus = Corpus::load(&store, &Domain::ALL)?;
//! let gatekeeper = Gatekeeper::new(SchemaRegistry::builtin(), ValidationConfig::default());
//!
//! let pass = gatekeeper.validate(&corpus, None)?;
//! println!("{} violation(s)", pass.violations.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod completeness;
mod config;
mod corpus;
mod error;
mod linker;
mod registry;
mod validator;

pub use completeness::{Assessment, CompletenessScorer, CoverageTable};
pub use config::ValidationConfig;
pub use corpus::Corpus;
pub use error::GatekeeperError;
pub use linker::{EntityIndex, RelationshipLinker};
pub use registry::{
    is_populated, lookup_field, DomainConfig, DomainSchema, FieldConfig, FieldLookup, FieldSpec,
    RegistryConfig, ResolvedSchema, SchemaRegistry, VersionConfig,
};
pub use validator::{Gatekeeper, ValidationPass};
