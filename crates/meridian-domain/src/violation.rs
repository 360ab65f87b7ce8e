//! Violations - immutable findings of a validation pass
//!
//! A pass emits a fresh set of violations; repairs never mutate them, a
//! later pass supersedes them.

use crate::{DocumentKey, Domain, EntityId, FieldPath};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How much a violation matters for the exit status
///
/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory only, never blocks
    Info,
    /// Recoverable, normalized transparently
    Low,
    /// Auto-repairable
    Medium,
    /// Blocks a clean exit, needs external data
    High,
    /// Broken references or unusable documents
    Critical,
}

impl Severity {
    /// Get the severity name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Fieldless discriminant of [`ViolationKind`], used for grouping and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationCode {
    /// A required schema field is absent
    MissingRequiredField,
    /// A relationship entry has no slug
    MissingSlug,
    /// A relationship entry's slug disagrees with its URL
    SlugUrlMismatch,
    /// A relationship entry points at an entity that does not exist
    DanglingReference,
    /// Schema version undeclared/unknown, or a field uses a non-canonical name
    SchemaVersionMismatch,
    /// A runtime-specific serialization tag was found
    SerializationArtifact,
    /// The document parsed but cannot be used (not a mapping, no id, duplicate id)
    MalformedDocument,
}

impl ViolationCode {
    /// Every violation code
    pub const ALL: [ViolationCode; 7] = [
        ViolationCode::MissingRequiredField,
        ViolationCode::MissingSlug,
        ViolationCode::SlugUrlMismatch,
        ViolationCode::DanglingReference,
        ViolationCode::SchemaVersionMismatch,
        ViolationCode::SerializationArtifact,
        ViolationCode::MalformedDocument,
    ];

    /// Get the code name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationCode::MissingRequiredField => "MissingRequiredField",
            ViolationCode::MissingSlug => "MissingSlug",
            ViolationCode::SlugUrlMismatch => "SlugUrlMismatch",
            ViolationCode::DanglingReference => "DanglingReference",
            ViolationCode::SchemaVersionMismatch => "SchemaVersionMismatch",
            ViolationCode::SerializationArtifact => "SerializationArtifact",
            ViolationCode::MalformedDocument => "MalformedDocument",
        }
    }

    /// Severity assigned to this kind of violation
    pub fn severity(&self) -> Severity {
        match self {
            ViolationCode::MalformedDocument | ViolationCode::DanglingReference => Severity::Critical,
            ViolationCode::MissingRequiredField => Severity::High,
            ViolationCode::MissingSlug | ViolationCode::SlugUrlMismatch => Severity::Medium,
            ViolationCode::SerializationArtifact => Severity::Low,
            ViolationCode::SchemaVersionMismatch => Severity::Info,
        }
    }

    /// Whether the batch repairer may fix this kind deterministically
    pub fn is_auto_repairable(&self) -> bool {
        matches!(
            self,
            ViolationCode::MissingSlug
                | ViolationCode::SlugUrlMismatch
                | ViolationCode::SerializationArtifact
        )
    }
}

impl fmt::Display for ViolationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a schema version mismatch was raised
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchReason {
    /// The document declares no version
    Undeclared,
    /// The declared version is not registered for the domain
    UnknownVersion,
    /// A field is present under an alias instead of its canonical name
    AliasedField {
        /// Name found in the document
        alias: String,
        /// Canonical name from the schema
        canonical: String,
    },
}

/// What went wrong, with the data needed to report or repair it
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind")]
pub enum ViolationKind {
    /// A required field is absent
    MissingRequiredField {
        /// Canonical field name
        field: String,
    },
    /// A relationship entry has no slug
    MissingSlug {
        /// Slug derived from the entry's URL
        expected_slug: String,
    },
    /// A relationship entry's slug disagrees with its URL
    SlugUrlMismatch {
        /// Slug currently stored
        slug: String,
        /// Slug derived from the entry's URL
        expected_slug: String,
    },
    /// A relationship entry points at an entity that does not exist
    DanglingReference {
        /// Domain segment of the entry's URL
        target_domain: String,
        /// Identifier that failed to resolve
        target_id: String,
    },
    /// Schema version undeclared/unknown, or a non-canonical field name
    SchemaVersionMismatch {
        /// Version declared on the document
        declared: Option<String>,
        /// Version actually applied
        resolved: String,
        /// Why the mismatch was raised
        reason: MismatchReason,
    },
    /// A runtime-specific serialization tag was normalized
    SerializationArtifact {
        /// The tag as written
        tag: String,
    },
    /// The document parsed but cannot be used
    MalformedDocument {
        /// What is wrong with it
        reason: String,
    },
}

impl ViolationKind {
    /// Fieldless discriminant
    pub fn code(&self) -> ViolationCode {
        match self {
            ViolationKind::MissingRequiredField { .. } => ViolationCode::MissingRequiredField,
            ViolationKind::MissingSlug { .. } => ViolationCode::MissingSlug,
            ViolationKind::SlugUrlMismatch { .. } => ViolationCode::SlugUrlMismatch,
            ViolationKind::DanglingReference { .. } => ViolationCode::DanglingReference,
            ViolationKind::SchemaVersionMismatch { .. } => ViolationCode::SchemaVersionMismatch,
            ViolationKind::SerializationArtifact { .. } => ViolationCode::SerializationArtifact,
            ViolationKind::MalformedDocument { .. } => ViolationCode::MalformedDocument,
        }
    }

    fn describe(&self, path: &FieldPath) -> String {
        match self {
            ViolationKind::MissingRequiredField { field } => {
                format!("Required field '{}' is missing", field)
            }
            ViolationKind::MissingSlug { expected_slug } => {
                format!("Relationship at '{}' has no slug (expected '{}')", path, expected_slug)
            }
            ViolationKind::SlugUrlMismatch { slug, expected_slug } => format!(
                "Slug '{}' at '{}' does not match URL-derived slug '{}'",
                slug, path, expected_slug
            ),
            ViolationKind::DanglingReference { target_domain, target_id } => format!(
                "Relationship at '{}' references '{}/{}', which does not exist",
                path, target_domain, target_id
            ),
            ViolationKind::SchemaVersionMismatch { declared, resolved, reason } => match reason {
                MismatchReason::Undeclared => {
                    format!("No schema version declared; applied latest '{}'", resolved)
                }
                MismatchReason::UnknownVersion => format!(
                    "Unknown schema version '{}'; applied latest '{}'",
                    declared.as_deref().unwrap_or(""),
                    resolved
                ),
                MismatchReason::AliasedField { alias, canonical } => format!(
                    "Field '{}' should be renamed to canonical '{}' (schema {})",
                    alias, canonical, resolved
                ),
            },
            ViolationKind::SerializationArtifact { tag } => {
                format!("Non-portable serialization tag '{}' at '{}'", tag, path)
            }
            ViolationKind::MalformedDocument { reason } => format!("Malformed document: {}", reason),
        }
    }
}

/// A single finding against one document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Violation {
    /// Domain of the offending document
    pub domain: Domain,
    /// Entity identifier of the offending document
    pub entity_id: EntityId,
    /// Offending field path
    pub path: FieldPath,
    /// What went wrong
    #[serde(flatten)]
    pub kind: ViolationKind,
    /// Human-readable description
    pub description: String,
}

impl Violation {
    /// Create a violation with a generated description
    pub fn new(key: &DocumentKey, path: FieldPath, kind: ViolationKind) -> Self {
        let description = kind.describe(&path);
        Self {
            domain: key.domain,
            entity_id: key.entity_id.clone(),
            path,
            kind,
            description,
        }
    }

    /// Replace the generated description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Key of the offending document
    pub fn key(&self) -> DocumentKey {
        DocumentKey {
            domain: self.domain,
            entity_id: self.entity_id.clone(),
        }
    }

    /// Fieldless discriminant
    pub fn code(&self) -> ViolationCode {
        self.kind.code()
    }

    /// Severity of this violation
    pub fn severity(&self) -> Severity {
        self.code().severity()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}/{} {}: {}",
            self.severity().as_str(),
            self.domain,
            self.entity_id,
            self.code(),
            self.description
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> DocumentKey {
        DocumentKey::new(Domain::Materials, "aluminum")
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_repairable_codes() {
        let repairable: Vec<_> = ViolationCode::ALL
            .iter()
            .filter(|c| c.is_auto_repairable())
            .collect();
        assert_eq!(repairable.len(), 3);
        assert!(!ViolationCode::DanglingReference.is_auto_repairable());
        assert!(!ViolationCode::MissingRequiredField.is_auto_repairable());
    }

    #[test]
    fn test_description_mentions_path() {
        let v = Violation::new(
            &key(),
            FieldPath::parse("relationships.contaminated_by[0].slug"),
            ViolationKind::MissingSlug {
                expected_slug: "rust-contamination".into(),
            },
        );
        assert_eq!(v.code(), ViolationCode::MissingSlug);
        assert_eq!(v.severity(), Severity::Medium);
        assert!(v.description.contains("relationships.contaminated_by[0].slug"));
        assert!(v.description.contains("rust-contamination"));
    }

    #[test]
    fn test_serializes_flat_with_kind_tag() {
        let v = Violation::new(
            &key(),
            FieldPath::parse("related[1]"),
            ViolationKind::DanglingReference {
                target_domain: "compounds".into(),
                target_id: "unobtainium".into(),
            },
        );
        let rendered = serde_yaml::to_string(&v).unwrap();
        assert!(rendered.contains("kind: DanglingReference"));
        assert!(rendered.contains("target_id: unobtainium"));
        assert!(rendered.contains("entity_id: aluminum"));
    }
}
