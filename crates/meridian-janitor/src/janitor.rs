//! Core Janitor implementation for batch repair

use crate::metrics::{RepairFailure, SlugDiscrepancy};
use crate::{JanitorError, RepairConfig, RepairResult, RepairWorker};
use meridian_domain::document::scalar_to_raw_string;
use meridian_domain::{
    Document, DocumentKey, DocumentStore, Violation, ViolationCode, ViolationKind,
};
use serde_yaml::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;

/// The repairs planned for one document
struct DocumentPlan<'a> {
    document: &'a Document,
    violations: Vec<&'a Violation>,
}

/// What happened to one document
enum DocumentOutcome {
    /// Nothing applied (every planned violation was stale)
    Unchanged { skipped: usize },
    /// Every edit applied; saved unless dry run
    Repaired {
        key: DocumentKey,
        fixed: Vec<ViolationCode>,
        skipped: usize,
        discrepancies: Vec<SlugDiscrepancy>,
    },
    /// An edit failed; the document was left untouched
    Failed { failure: RepairFailure, skipped: usize },
}

/// Result of applying one violation's edit to a working copy
enum Applied {
    Fixed(Option<SlugDiscrepancy>),
    Stale,
}

/// Janitor service for batch repair
///
/// Responsible for:
/// - Grouping repairable violations by document
/// - Applying each document's edits to a copy, all-or-nothing
/// - Saving changed documents through the store (skipped in dry run)
/// - Recording every overwritten slug for review
///
/// # Examples
///
/// ```no_run
/// use meridian_janitor::Janitor;
/// use meridian_store::YamlStore;
/// # use meridian_domain::{Document, Violation};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let documents: Vec<Document> = Vec::new();
/// # let violations: Vec<Violation> = Vec::new();
/// let store = YamlStore::open("content")?;
/// let janitor = Janitor::default_config();
///
/// let result = janitor.repair(&store, &documents, &violations)?;
/// println!("{}", result.summary());
/// # Ok(())
/// # }
/// ```
pub struct Janitor {
    config: RepairConfig,
}

impl Janitor {
    /// Create a new Janitor with the given configuration
    pub fn new(config: RepairConfig) -> Self {
        Self { config }
    }

    /// Create a Janitor with default configuration
    pub fn default_config() -> Self {
        Self::new(RepairConfig::default())
    }

    /// Current configuration
    pub fn config(&self) -> &RepairConfig {
        &self.config
    }

    /// Whether the Janitor will act on a violation kind
    pub fn handles(&self, code: ViolationCode) -> bool {
        match code {
            ViolationCode::MissingSlug => true,
            ViolationCode::SlugUrlMismatch => self.config.repair_slug_mismatch,
            ViolationCode::SerializationArtifact => self.config.normalize_artifacts,
            _ => false,
        }
    }

    /// Repair every repairable violation in `violations`
    ///
    /// `documents` must be the documents the violations were computed from.
    /// Documents are repaired in parallel; each one is saved at most once.
    ///
    /// # Errors
    /// Returns [`JanitorError::Store`] as soon as a save fails. Documents
    /// saved before the failure keep their repairs.
    pub fn repair<S>(
        &self,
        store: &S,
        documents: &[Document],
        violations: &[Violation],
    ) -> Result<RepairResult, JanitorError>
    where
        S: DocumentStore + Sync,
        S::Error: Display,
    {
        let mut result = RepairResult::new(self.config.dry_run);
        let (plans, unplanned) = self.plan(documents, violations);
        result.record_skipped(unplanned);

        let worker = RepairWorker::new(self.config.workers)?;
        let outcomes = worker.map(&plans, |plan| self.repair_document(store, plan));

        for outcome in outcomes {
            match outcome? {
                DocumentOutcome::Unchanged { skipped } => result.record_skipped(skipped),
                DocumentOutcome::Repaired {
                    key,
                    fixed,
                    skipped,
                    discrepancies,
                } => {
                    for code in fixed {
                        result.record_fix(code);
                    }
                    result.record_skipped(skipped);
                    result.discrepancies.extend(discrepancies);
                    result.record_change(key);
                }
                DocumentOutcome::Failed { failure, skipped } => {
                    result.record_skipped(skipped);
                    result.failures.push(failure);
                }
            }
        }

        result.changed.sort();
        tracing::info!(
            "{}Repair finished: {} document(s) changed, {} fixed, {} skipped",
            if self.config.dry_run { "DRY RUN: " } else { "" },
            result.documents_changed,
            result.violations_fixed,
            result.violations_skipped
        );
        Ok(result)
    }

    /// Group handled violations by document
    ///
    /// Returns the plans (in document order) and the number of violations
    /// that will not be attempted.
    fn plan<'a>(
        &self,
        documents: &'a [Document],
        violations: &'a [Violation],
    ) -> (Vec<DocumentPlan<'a>>, usize) {
        let by_key: HashMap<DocumentKey, usize> = documents
            .iter()
            .enumerate()
            .map(|(i, d)| (d.key(), i))
            .collect();

        let mut grouped: BTreeMap<usize, Vec<&'a Violation>> = BTreeMap::new();
        let mut unplanned = 0;
        for violation in violations {
            match by_key.get(&violation.key()) {
                Some(&index) if self.handles(violation.code()) => {
                    grouped.entry(index).or_default().push(violation);
                }
                _ => unplanned += 1,
            }
        }

        let plans = grouped
            .into_iter()
            .map(|(index, mut violations)| {
                violations.sort_by(|a, b| a.path.cmp(&b.path));
                DocumentPlan {
                    document: &documents[index],
                    violations,
                }
            })
            .collect();
        (plans, unplanned)
    }

    /// Apply one document's plan and save it
    fn repair_document<S>(
        &self,
        store: &S,
        plan: &DocumentPlan<'_>,
    ) -> Result<DocumentOutcome, JanitorError>
    where
        S: DocumentStore,
        S::Error: Display,
    {
        let key = plan.document.key();
        let mut working = plan.document.clone();
        let mut fixed = Vec::new();
        let mut discrepancies = Vec::new();
        let mut stale = 0;

        for violation in &plan.violations {
            match self.apply(&mut working, violation) {
                Ok(Applied::Fixed(discrepancy)) => {
                    fixed.push(violation.code());
                    discrepancies.extend(discrepancy);
                }
                Ok(Applied::Stale) => stale += 1,
                Err(reason) => {
                    tracing::warn!("Leaving {} unchanged: {}", key, reason);
                    return Ok(DocumentOutcome::Failed {
                        failure: RepairFailure { key, reason },
                        skipped: plan.violations.len(),
                    });
                }
            }
        }

        if fixed.is_empty() {
            return Ok(DocumentOutcome::Unchanged { skipped: stale });
        }

        for d in &discrepancies {
            tracing::warn!(
                "Slug at {} {} disagrees with its URL: '{}' replaced by '{}' (review)",
                d.key,
                d.path,
                d.original,
                d.replacement
            );
        }

        // The saved form is always portable
        working.artifacts.clear();

        if self.config.dry_run {
            tracing::info!("DRY RUN: Would save {} ({} fix(es))", key, fixed.len());
        } else {
            store
                .save(&working)
                .map_err(|e| JanitorError::Store(format!("{}: {}", key, e)))?;
            tracing::debug!("Saved {} ({} fix(es))", key, fixed.len());
        }

        Ok(DocumentOutcome::Repaired {
            key,
            fixed,
            skipped: stale,
            discrepancies,
        })
    }

    /// Apply one violation's edit to the working copy
    fn apply(&self, document: &mut Document, violation: &Violation) -> Result<Applied, String> {
        let current = document.get(&violation.path).and_then(scalar_to_raw_string);

        match &violation.kind {
            ViolationKind::MissingSlug { expected_slug } => {
                if current.is_some() {
                    return Ok(Applied::Stale);
                }
                document.set(&violation.path, Value::String(expected_slug.clone()))?;
                Ok(Applied::Fixed(None))
            }
            ViolationKind::SlugUrlMismatch {
                slug,
                expected_slug,
            } => {
                if current.as_deref() != Some(slug.as_str()) {
                    return Ok(Applied::Stale);
                }
                document.set(&violation.path, Value::String(expected_slug.clone()))?;
                Ok(Applied::Fixed(Some(SlugDiscrepancy {
                    key: document.key(),
                    path: violation.path.clone(),
                    original: slug.clone(),
                    replacement: expected_slug.clone(),
                })))
            }
            ViolationKind::SerializationArtifact { .. } if document.has_artifacts() => {
                Ok(Applied::Fixed(None))
            }
            _ => Ok(Applied::Stale),
        }
    }
}
