//! Relationship linking - slug/URL agreement and reference resolution

use meridian_domain::relationship::{collect_entries, ID_KEY, SLUG_KEY, TITLE_KEY, URL_KEY};
use meridian_domain::{Document, Domain, Violation, ViolationKind};
use std::collections::{HashMap, HashSet};

/// Read-only snapshot of every entity id, per domain
///
/// Built once before validation starts; repairs never change it.
#[derive(Debug, Clone, Default)]
pub struct EntityIndex {
    ids: HashMap<Domain, HashSet<String>>,
}

impl EntityIndex {
    /// Index a set of documents
    pub fn build<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut ids: HashMap<Domain, HashSet<String>> = HashMap::new();
        for document in documents {
            ids.entry(document.domain)
                .or_default()
                .insert(document.entity_id.as_str().to_string());
        }
        Self { ids }
    }

    /// Whether an entity exists
    pub fn contains(&self, domain: Domain, id: &str) -> bool {
        self.ids.get(&domain).is_some_and(|ids| ids.contains(id))
    }

    /// Number of entities in one domain
    pub fn domain_len(&self, domain: Domain) -> usize {
        self.ids.get(&domain).map_or(0, HashSet::len)
    }

    /// Total number of indexed entities
    pub fn len(&self) -> usize {
        self.ids.values().map(HashSet::len).sum()
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Checks every relationship entry of a document
pub struct RelationshipLinker<'a> {
    index: &'a EntityIndex,
}

impl<'a> RelationshipLinker<'a> {
    /// Create a linker over an entity index
    pub fn new(index: &'a EntityIndex) -> Self {
        Self { index }
    }

    /// Find relationship violations in one document
    ///
    /// The URL is authoritative for the slug. Each unresolvable entry yields
    /// exactly one `DanglingReference`.
    pub fn check(&self, document: &Document) -> Vec<Violation> {
        let key = document.key();
        let mut violations = Vec::new();

        for located in collect_entries(&document.fields) {
            let entry = &located.entry;
            let missing = |field: &str| {
                Violation::new(
                    &key,
                    located.field(field),
                    ViolationKind::MissingRequiredField {
                        field: field.to_string(),
                    },
                )
            };

            if entry.id.is_none() {
                violations.push(missing(ID_KEY));
            }
            if entry.title.is_none() {
                violations.push(missing(TITLE_KEY));
            }

            let target = match (&entry.url, entry.target()) {
                (None, _) => {
                    violations.push(missing(URL_KEY));
                    continue;
                }
                (Some(url), None) => {
                    violations.push(missing(URL_KEY).with_description(format!(
                        "Relationship URL '{}' at '{}' is not of the form /<domain>/<slug>",
                        url,
                        located.field(URL_KEY)
                    )));
                    continue;
                }
                (Some(_), Some(target)) => target,
            };

            match &entry.slug {
                None => violations.push(Violation::new(
                    &key,
                    located.field(SLUG_KEY),
                    ViolationKind::MissingSlug {
                        expected_slug: target.slug.clone(),
                    },
                )),
                Some(slug) if *slug != target.slug => violations.push(Violation::new(
                    &key,
                    located.field(SLUG_KEY),
                    ViolationKind::SlugUrlMismatch {
                        slug: slug.clone(),
                        expected_slug: target.slug.clone(),
                    },
                )),
                Some(_) => {}
            }

            let target_id = entry.id.clone().unwrap_or_else(|| target.slug.clone());
            let resolved = Domain::parse(&target.domain_segment)
                .is_some_and(|domain| self.index.contains(domain, &target_id));
            if !resolved {
                violations.push(Violation::new(
                    &key,
                    located.path.clone(),
                    ViolationKind::DanglingReference {
                        target_domain: target.domain_segment.clone(),
                        target_id,
                    },
                ));
            }
        }

        violations
    }
}
