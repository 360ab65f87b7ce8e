//! Relationship entries - directed references between documents
//!
//! An entry addresses its target as `/<domain>/<slug>`. The final URL segment
//! is the canonical slug; the first segment names the target domain.

use crate::document::{scalar_to_raw_string, scalar_to_string};
use crate::FieldPath;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

/// Entry key holding the target entity identifier
pub const ID_KEY: &str = "id";
/// Entry key holding the canonical path segment
pub const SLUG_KEY: &str = "slug";
/// Entry key holding the display label
pub const TITLE_KEY: &str = "title";
/// Entry key holding the canonical address
pub const URL_KEY: &str = "url";

/// An edge from one document to another, possibly cross-domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationshipEntry {
    /// Target entity identifier
    pub id: Option<String>,
    /// Canonical path segment (required after repair)
    pub slug: Option<String>,
    /// Display label
    pub title: Option<String>,
    /// Canonical address, `/<domain>/<slug>`
    pub url: Option<String>,
}

/// The target addressed by an entry's URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTarget {
    /// First path segment (expected to name a domain)
    pub domain_segment: String,
    /// Final path segment
    pub slug: String,
}

/// A relationship entry together with its location in the referencing document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedEntry {
    /// Path of the entry mapping (e.g. `relationships.contaminated_by[0]`)
    pub path: FieldPath,
    /// The parsed entry
    pub entry: RelationshipEntry,
}

impl LocatedEntry {
    /// Path of one of this entry's keys
    pub fn field(&self, key: &str) -> FieldPath {
        self.path.key(key)
    }
}

impl RelationshipEntry {
    /// Whether a mapping has the shape of a relationship entry
    ///
    /// Anything carrying a `url`, or both an `id` and a `title`, counts.
    pub fn is_entry(map: &Mapping) -> bool {
        map.contains_key(URL_KEY) || (map.contains_key(ID_KEY) && map.contains_key(TITLE_KEY))
    }

    /// Read an entry from its mapping; blank values count as absent
    ///
    /// The slug is kept as written so padding shows up as a mismatch.
    pub fn from_mapping(map: &Mapping) -> Self {
        let read = |key: &str| map.get(key).and_then(scalar_to_string);
        Self {
            id: read(ID_KEY),
            slug: map.get(SLUG_KEY).and_then(scalar_to_raw_string),
            title: read(TITLE_KEY),
            url: read(URL_KEY),
        }
    }

    /// The target addressed by `url`, if it is well formed
    pub fn target(&self) -> Option<UrlTarget> {
        self.url.as_deref().and_then(parse_url)
    }

    /// The slug implied by `url`
    pub fn expected_slug(&self) -> Option<String> {
        self.target().map(|t| t.slug)
    }
}

/// Parse a canonical address of the form `/<domain>/.../<slug>`
///
/// Query strings, fragments and trailing slashes are ignored. Returns `None`
/// unless the address is absolute and has at least two segments.
pub fn parse_url(url: &str) -> Option<UrlTarget> {
    let url = url.trim();
    let url = url.split(['?', '#']).next().unwrap_or(url);
    if !url.starts_with('/') {
        return None;
    }
    let segments: Vec<&str> = url.split('/').filter(|s| !s.is_empty()).collect();
    if segments.len() < 2 {
        return None;
    }
    Some(UrlTarget {
        domain_segment: segments[0].to_string(),
        slug: segments[segments.len() - 1].to_string(),
    })
}

/// Collect every relationship entry in a document tree, in document order
pub fn collect_entries(fields: &Mapping) -> Vec<LocatedEntry> {
    let mut found = Vec::new();
    for (key, value) in fields {
        if let Some(key) = key.as_str() {
            walk(value, FieldPath::root().key(key), &mut found);
        }
    }
    found
}

fn walk(value: &Value, path: FieldPath, found: &mut Vec<LocatedEntry>) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                if let Some(key) = key.as_str() {
                    walk(child, path.key(key), found);
                }
            }
        }
        Value::Sequence(seq) => {
            for (index, item) in seq.iter().enumerate() {
                match item {
                    Value::Mapping(map) if RelationshipEntry::is_entry(map) => {
                        found.push(LocatedEntry {
                            path: path.index(index),
                            entry: RelationshipEntry::from_mapping(map),
                        });
                    }
                    _ => walk(item, path.index(index), found),
                }
            }
        }
        Value::Tagged(tagged) => walk(&tagged.value, path, found),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url() {
        let target = parse_url("/contaminants/rust-contamination").unwrap();
        assert_eq!(target.domain_segment, "contaminants");
        assert_eq!(target.slug, "rust-contamination");
    }

    #[test]
    fn test_parse_url_nested_and_decorated() {
        let target = parse_url("/materials/metal/non-ferrous/aluminum-laser-cleaning/?tab=1#top").unwrap();
        assert_eq!(target.domain_segment, "materials");
        assert_eq!(target.slug, "aluminum-laser-cleaning");
    }

    #[test]
    fn test_parse_url_rejects_malformed() {
        assert!(parse_url("materials/aluminum").is_none());
        assert!(parse_url("/materials").is_none());
        assert!(parse_url("").is_none());
    }

    #[test]
    fn test_collect_entries_finds_nested_lists() {
        let fields: Mapping = serde_yaml::from_str(
            r#"
id: aluminum
tags: [metal, light]
relationships:
  contaminated_by:
    - id: rust-contamination
      title: Rust
      url: /contaminants/rust-contamination
    - id: oil
      title: Oil
      slug: ""
      url: /contaminants/oil
  produces:
    - id: alumina
      title: Alumina
related_settings:
  - url: /settings/aluminum-settings
"#,
        )
        .unwrap();

        let entries = collect_entries(&fields);
        let paths: Vec<String> = entries.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "relationships.contaminated_by[0]",
                "relationships.contaminated_by[1]",
                "relationships.produces[0]",
                "related_settings[0]",
            ]
        );
        // Blank slug reads as absent
        assert!(entries[1].entry.slug.is_none());
        assert_eq!(entries[1].entry.expected_slug().as_deref(), Some("oil"));
        assert!(entries[2].entry.url.is_none());
    }

    #[test]
    fn test_padded_slug_kept_as_written() {
        let map: Mapping =
            serde_yaml::from_str("id: ' foo '\nslug: ' foo '\ntitle: Foo\nurl: /materials/foo\n")
                .unwrap();
        let entry = RelationshipEntry::from_mapping(&map);
        assert_eq!(entry.id.as_deref(), Some("foo"));
        assert_eq!(entry.slug.as_deref(), Some(" foo "));
        assert_ne!(entry.slug, entry.expected_slug());
    }
}
