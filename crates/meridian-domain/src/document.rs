//! Document module - one structured record per named entity

use crate::{Domain, FieldPath, SchemaVersion, Segment};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::PathBuf;

/// Top-level field holding the entity identifier
pub const ID_FIELD: &str = "id";

/// Top-level field declaring the document's schema version
pub const SCHEMA_VERSION_FIELD: &str = "schemaVersion";

/// Underscored spelling of [`SCHEMA_VERSION_FIELD`] found in older documents
pub const SCHEMA_VERSION_ALIAS: &str = "schema_version";

/// Identifier of an entity, unique within its domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create a new entity identifier
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the identifier as a string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Corpus-wide address of a document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentKey {
    /// Owning domain
    pub domain: Domain,
    /// Entity identifier within the domain
    pub entity_id: EntityId,
}

impl DocumentKey {
    /// Create a new document key
    pub fn new(domain: Domain, entity_id: impl Into<EntityId>) -> Self {
        Self {
            domain,
            entity_id: entity_id.into(),
        }
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.entity_id)
    }
}

/// A runtime-specific serialization tag that was normalized away on load
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LegacyArtifact {
    /// Where the tagged value sat in the document
    pub path: FieldPath,
    /// The tag as written (e.g. `!!python/object/apply:collections.OrderedDict`)
    pub tag: String,
}

/// One structured record describing a single named entity
///
/// `fields` keeps the on-disk key order. The entity id is fixed at
/// construction and never changes through repairs.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Owning domain
    pub domain: Domain,

    /// Entity identifier (unique within the domain)
    pub entity_id: EntityId,

    /// Declared schema version, if any
    pub schema_version: Option<SchemaVersion>,

    /// Ordered top-level fields
    pub fields: Mapping,

    /// File the document was loaded from
    pub origin: Option<PathBuf>,

    /// Legacy tags normalized while loading; a save is owed for these
    pub artifacts: Vec<LegacyArtifact>,
}

impl Document {
    /// Build a document from its top-level fields
    ///
    /// The entity id is taken from the `id` field, or from `fallback_id`
    /// (usually the file stem) when `id` is absent.
    ///
    /// # Errors
    /// Returns an error when neither source yields a non-empty identifier.
    pub fn from_fields(
        domain: Domain,
        fields: Mapping,
        fallback_id: Option<&str>,
    ) -> Result<Self, String> {
        let entity_id = match fields.get(ID_FIELD) {
            Some(value) => scalar_to_string(value)
                .ok_or_else(|| "Field 'id' must be a non-empty scalar".to_string())?,
            None => fallback_id
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .ok_or_else(|| "Document has no 'id' field".to_string())?,
        };

        let schema_version = fields
            .get(SCHEMA_VERSION_FIELD)
            .or_else(|| fields.get(SCHEMA_VERSION_ALIAS))
            .and_then(scalar_to_string)
            .map(SchemaVersion::new);

        Ok(Self {
            domain,
            entity_id: EntityId::new(entity_id),
            schema_version,
            fields,
            origin: None,
            artifacts: Vec::new(),
        })
    }

    /// Attach the source file
    pub fn with_origin(mut self, origin: PathBuf) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Corpus-wide key of this document
    pub fn key(&self) -> DocumentKey {
        DocumentKey {
            domain: self.domain,
            entity_id: self.entity_id.clone(),
        }
    }

    /// Whether loading normalized any legacy serialization tags
    pub fn has_artifacts(&self) -> bool {
        !self.artifacts.is_empty()
    }

    /// Look up the value at `path`
    pub fn get(&self, path: &FieldPath) -> Option<&Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = match first {
            Segment::Key(key) => self.fields.get(key.as_str())?,
            Segment::Index(_) => return None,
        };
        for segment in rest {
            current = match (segment, current) {
                (Segment::Key(key), Value::Mapping(map)) => map.get(key.as_str())?,
                (Segment::Index(index), Value::Sequence(seq)) => seq.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Mutable lookup of the value at `path`
    pub fn get_mut(&mut self, path: &FieldPath) -> Option<&mut Value> {
        let (first, rest) = path.segments().split_first()?;
        let mut current = match first {
            Segment::Key(key) => self.fields.get_mut(key.as_str())?,
            Segment::Index(_) => return None,
        };
        for segment in rest {
            current = match (segment, current) {
                (Segment::Key(key), Value::Mapping(map)) => map.get_mut(key.as_str())?,
                (Segment::Index(index), Value::Sequence(seq)) => seq.get_mut(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Set the value at `path`, returning the previous value
    ///
    /// The parent container must already exist. Existing keys keep their
    /// position; a new key is appended after the parent's existing keys.
    ///
    /// # Errors
    /// Returns an error if the path is empty, the parent does not exist, or the
    /// parent is not the right kind of container.
    pub fn set(&mut self, path: &FieldPath, value: Value) -> Result<Option<Value>, String> {
        let last = path
            .last()
            .ok_or_else(|| "Cannot replace the document root".to_string())?
            .clone();
        let parent = path.parent().unwrap_or_default();

        if parent.is_root() {
            return match last {
                Segment::Key(key) => Ok(self.fields.insert(Value::String(key), value)),
                Segment::Index(_) => Err(format!("Invalid top-level path '{}'", path)),
            };
        }

        let container = self
            .get_mut(&parent)
            .ok_or_else(|| format!("Parent '{}' does not exist", parent))?;
        match (last, container) {
            (Segment::Key(key), Value::Mapping(map)) => Ok(map.insert(Value::String(key), value)),
            (Segment::Index(index), Value::Sequence(seq)) => match seq.get_mut(index) {
                Some(slot) => Ok(Some(std::mem::replace(slot, value))),
                None => Err(format!("Index {} out of bounds at '{}'", index, parent)),
            },
            _ => Err(format!("Parent '{}' has the wrong shape for '{}'", parent, path)),
        }
    }
}

/// Render a scalar YAML value as a trimmed, non-empty string
pub fn scalar_to_string(value: &Value) -> Option<String> {
    scalar_to_raw_string(value).map(|s| s.trim().to_string())
}

/// Render a scalar YAML value exactly as stored, `None` if blank
///
/// Used where surrounding whitespace is itself a defect, such as slugs.
pub fn scalar_to_raw_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
