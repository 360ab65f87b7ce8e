//! Repair results

use meridian_domain::{DocumentKey, FieldPath, ViolationCode};
use serde::Serialize;
use std::collections::BTreeMap;

/// A slug the Janitor overwrote, kept for manual review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlugDiscrepancy {
    /// Document holding the entry
    pub key: DocumentKey,
    /// Path of the slug field
    pub path: FieldPath,
    /// Slug before repair
    pub original: String,
    /// URL-derived slug written in its place
    pub replacement: String,
}

/// A document whose repairs were abandoned
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairFailure {
    /// Document left untouched
    pub key: DocumentKey,
    /// Why an edit could not be applied
    pub reason: String,
}

/// Outcome of one repair run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairResult {
    /// Documents saved (or that would be saved in a dry run)
    pub documents_changed: usize,

    /// Violations repaired
    pub violations_fixed: usize,

    /// Violations left as they are (unrepairable, disabled, stale, or in a
    /// failed document)
    pub violations_skipped: usize,

    /// Repaired violations per kind
    pub fixed_by_kind: BTreeMap<ViolationCode, usize>,

    /// Keys of changed documents, sorted
    pub changed: Vec<DocumentKey>,

    /// Overwritten slugs
    pub discrepancies: Vec<SlugDiscrepancy>,

    /// Documents whose edits were abandoned
    pub failures: Vec<RepairFailure>,

    /// Whether this was a dry run
    pub dry_run: bool,
}

impl RepairResult {
    /// Create an empty result
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Record one repaired violation
    pub fn record_fix(&mut self, code: ViolationCode) {
        self.violations_fixed += 1;
        *self.fixed_by_kind.entry(code).or_insert(0) += 1;
    }

    /// Record skipped violations
    pub fn record_skipped(&mut self, count: usize) {
        self.violations_skipped += count;
    }

    /// Record a changed document
    pub fn record_change(&mut self, key: DocumentKey) {
        self.documents_changed += 1;
        self.changed.push(key);
    }

    /// Repaired violations of one kind
    pub fn fixed(&self, code: ViolationCode) -> usize {
        self.fixed_by_kind.get(&code).copied().unwrap_or(0)
    }

    /// Whether the run changed nothing
    pub fn is_noop(&self) -> bool {
        self.documents_changed == 0
    }

    /// Generate a summary report
    pub fn summary(&self) -> String {
        let mut lines = vec![
            if self.dry_run {
                "Repair Summary (dry run)".to_string()
            } else {
                "Repair Summary".to_string()
            },
            "==============".to_string(),
            format!("Documents changed: {}", self.documents_changed),
            format!("Violations fixed: {}", self.violations_fixed),
            format!("Violations skipped: {}", self.violations_skipped),
        ];

        if !self.fixed_by_kind.is_empty() {
            lines.push(String::new());
            lines.push("Fixed by kind:".to_string());
            for (code, count) in &self.fixed_by_kind {
                lines.push(format!("  {}: {}", code, count));
            }
        }

        if !self.discrepancies.is_empty() {
            lines.push(String::new());
            lines.push("Slugs replaced (review):".to_string());
            for d in &self.discrepancies {
                lines.push(format!(
                    "  {} {}: '{}' -> '{}'",
                    d.key, d.path, d.original, d.replacement
                ));
            }
        }

        if !self.failures.is_empty() {
            lines.push(String::new());
            lines.push("Documents left unchanged after a failed edit:".to_string());
            for f in &self.failures {
                lines.push(format!("  {}: {}", f.key, f.reason));
            }
        }

        lines.join("\n")
    }
}
