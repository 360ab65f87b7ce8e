//! Meridian Domain Layer
//!
//! This crate contains the data model shared by every Meridian component.
//! It depends only on `serde`/`serde_yaml` (documents are ordered YAML trees)
//! and defines the value objects and trait interfaces the other layers build on.
//!
//! ## Key Concepts
//!
//! - **Domain**: A top-level entity category (materials, contaminants, compounds, settings)
//! - **Document**: One structured record describing a single named entity
//! - **Relationship entry**: A directed, possibly cross-domain reference between documents
//! - **Violation**: An immutable finding emitted by a validation pass
//! - **Completeness**: Per-field coverage and per-document confidence scoring
//!
//! ## Architecture
//!
//! - Pure data model and helpers only
//! - Storage, validation and repair live in other crates
//! - Trait definitions for all external interactions (see [`traits`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod completeness;
pub mod document;
pub mod domain;
pub mod field_path;
pub mod relationship;
pub mod schema_version;
pub mod traits;
pub mod violation;

// Re-exports for convenience
pub use completeness::{DocumentScore, FieldCoverage, MAX_CONFIDENCE};
pub use document::{Document, DocumentKey, EntityId, LegacyArtifact};
pub use domain::Domain;
pub use field_path::{FieldPath, Segment};
pub use relationship::{LocatedEntry, RelationshipEntry, UrlTarget};
pub use schema_version::SchemaVersion;
pub use traits::{DocumentStore, LoadOutcome};
pub use violation::{MismatchReason, Severity, Violation, ViolationCode, ViolationKind};
