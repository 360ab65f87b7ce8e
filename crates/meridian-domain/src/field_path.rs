//! Field paths addressing values inside a document tree
//!
//! Paths render as `relationships.contaminated_by[2].slug`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// One step of a field path
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Mapping key
    Key(String),
    /// Sequence index
    Index(usize),
}

/// Location of a value inside a document, from the top-level mapping down
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// The empty path (the document itself)
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Parse a dotted path with optional `[index]` suffixes
    ///
    /// Bracketed text that is not a number is kept as a key.
    pub fn parse(s: &str) -> Self {
        let mut segments = Vec::new();
        for part in s.split('.').filter(|p| !p.is_empty()) {
            let (name, mut rest) = match part.find('[') {
                Some(i) => (&part[..i], &part[i..]),
                None => (part, ""),
            };
            if !name.is_empty() {
                segments.push(Segment::Key(name.to_string()));
            }
            while let Some(stripped) = rest.strip_prefix('[') {
                match stripped.find(']') {
                    Some(end) => {
                        let inner = &stripped[..end];
                        match inner.parse::<usize>() {
                            Ok(index) => segments.push(Segment::Index(index)),
                            Err(_) => segments.push(Segment::Key(inner.to_string())),
                        }
                        rest = &stripped[end + 1..];
                    }
                    None => {
                        segments.push(Segment::Key(rest.to_string()));
                        break;
                    }
                }
            }
        }
        Self(segments)
    }

    /// Child path under a mapping key
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Key(key.into()));
        Self(segments)
    }

    /// Child path under a sequence index
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(Segment::Index(index));
        Self(segments)
    }

    /// All segments, outermost first
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// The final segment, if any
    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// The path without its final segment
    pub fn parent(&self) -> Option<FieldPath> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Whether this is the root path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` equals `other` or lies underneath it
    pub fn starts_with(&self, other: &FieldPath) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

impl Serialize for FieldPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for FieldPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}
