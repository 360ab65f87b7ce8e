//! Meridian Janitor
//!
//! Batch repair of auto-repairable violations.
//!
//! # Overview
//!
//! The Janitor is responsible for:
//! - **Slug repair**: filling in missing slugs and replacing slugs that
//!   disagree with their URL
//! - **Artifact normalization**: re-saving documents that were loaded from
//!   legacy runtime-specific YAML tags
//! - **Metrics collection**: counting changed documents, fixed and skipped
//!   violations, and every slug it overwrote
//!
//! Dangling references and missing required fields are never repaired; the
//! Janitor only counts them as skipped.
//!
//! ## Repair guarantees
//!
//! | Guarantee | How |
//! |-----------|-----|
//! | **Atomic per document** | edits go to a copy; the copy is saved only if every edit applied |
//! | **Minimal diff** | only the violation's field path is written |
//! | **Idempotent** | stale violations (already fixed) are skipped, never re-applied |
//! | **Dry run** | same [`RepairResult`], no writes |
//!
//! # Usage
//!
//! ```no_run
//! use meridian_janitor::{Janitor, RepairConfig};
//! use meridian_store::YamlStore;
//! # use meridian_domain::{Document, Violation};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! # let documents: Vec<Document> = Vec::new();
//! # let violations: Vec<Violation> = Vec::new();
//! let store = YamlStore::open("content")?;
//! let janitor = Janitor::new(RepairConfig::dry_run());
//!
//! let result = janitor.repair(&store, &documents, &violations)?;
//! println!("{}", result.summary());
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Presets
//!
//! ```
//! use meridian_janitor::RepairConfig;
//!
//! // Default: repair everything repairable and save
//! let config = RepairConfig::default();
//! assert!(!config.dry_run);
//!
//! // Dry run: compute the result without writing
//! let config = RepairConfig::dry_run();
//! assert!(config.dry_run);
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod janitor;
mod metrics;
mod worker;

pub use config::RepairConfig;
pub use error::JanitorError;
pub use janitor::Janitor;
pub use metrics::{RepairFailure, RepairResult, SlugDiscrepancy};
pub use worker::RepairWorker;
