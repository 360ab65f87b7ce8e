//! Report emitter - aggregate summaries and exit status

use crate::Scope;
use meridian_domain::{DocumentScore, Domain, Severity, Violation, ViolationCode};
use meridian_gatekeeper::ValidationPass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Process exit status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitStatus {
    /// No violations above the configured thresholds
    Clean,
    /// Violations above the configured thresholds
    ViolationsFound,
    /// The tool could not run (I/O or parse failure)
    Fatal,
}

impl ExitStatus {
    /// Numeric process exit code
    ///
    /// Kept distinct from the argument parser's usage-error code (2).
    pub fn code(&self) -> i32 {
        match self {
            ExitStatus::Clean => 0,
            ExitStatus::ViolationsFound => 1,
            ExitStatus::Fatal => 3,
        }
    }
}

/// How many violations of each blocking severity a run tolerates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityThresholds {
    /// Tolerated critical violations
    pub max_critical: usize,
    /// Tolerated high violations
    pub max_high: usize,
}

/// One row of the coverage table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageRow {
    /// Domain
    pub domain: Domain,
    /// Canonical field name
    pub field: String,
    /// Documents populating the field
    pub present_count: usize,
    /// Documents whose schema declares the field
    pub total_count: usize,
    /// `present_count / total_count`
    pub coverage_ratio: f64,
}

/// Completeness summary: field coverage plus per-document scores
#[derive(Debug, Clone, Default, Serialize)]
pub struct CompletenessTable {
    /// Coverage per (domain, field), ordered by domain then field
    pub fields: Vec<CoverageRow>,
    /// One score per document
    pub documents: Vec<DocumentScore>,
}

impl CompletenessTable {
    /// Build the table from a validation pass
    pub fn from_pass(pass: &ValidationPass) -> Self {
        let fields = pass
            .coverage
            .iter()
            .map(|(domain, field, coverage)| CoverageRow {
                domain,
                field: field.to_string(),
                present_count: coverage.present_count,
                total_count: coverage.total_count,
                coverage_ratio: coverage.coverage_ratio(),
            })
            .collect();
        Self {
            fields,
            documents: pass.scores.clone(),
        }
    }

    /// Coverage row for one field
    pub fn row(&self, domain: Domain, field: &str) -> Option<&CoverageRow> {
        self.fields
            .iter()
            .find(|r| r.domain == domain && r.field == field)
    }

    /// Documents failing the completeness gate
    pub fn failing(&self) -> impl Iterator<Item = &DocumentScore> {
        self.documents.iter().filter(|s| !s.passed())
    }
}

/// Aggregate result of a validation pass
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// What was checked
    pub scope: Scope,

    /// Documents checked (rejected documents excluded)
    pub documents_checked: usize,

    /// Total violations
    pub total: usize,

    /// Violation counts per domain and kind
    pub by_domain: BTreeMap<Domain, BTreeMap<ViolationCode, usize>>,

    /// Violation counts per kind
    pub by_kind: BTreeMap<ViolationCode, usize>,

    /// Violation counts per severity
    pub by_severity: BTreeMap<Severity, usize>,

    /// Every violation, ordered by domain, entity and path
    pub violations: Vec<Violation>,

    /// Field coverage and document scores
    pub completeness: CompletenessTable,
}

impl Report {
    /// Aggregate a validation pass
    pub fn from_pass(scope: Scope, pass: &ValidationPass) -> Self {
        let mut by_domain: BTreeMap<Domain, BTreeMap<ViolationCode, usize>> = BTreeMap::new();
        let mut by_kind = BTreeMap::new();
        let mut by_severity = BTreeMap::new();

        for violation in &pass.violations {
            *by_domain
                .entry(violation.domain)
                .or_default()
                .entry(violation.code())
                .or_insert(0) += 1;
            *by_kind.entry(violation.code()).or_insert(0) += 1;
            *by_severity.entry(violation.severity()).or_insert(0) += 1;
        }

        Self {
            scope,
            documents_checked: pass.documents_checked,
            total: pass.violations.len(),
            by_domain,
            by_kind,
            by_severity,
            violations: pass.violations.clone(),
            completeness: CompletenessTable::from_pass(pass),
        }
    }

    /// Violations of one severity
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or(0)
    }

    /// Violations of one kind
    pub fn count(&self, code: ViolationCode) -> usize {
        self.by_kind.get(&code).copied().unwrap_or(0)
    }

    /// Whether the report has no violations at all
    pub fn is_clean(&self) -> bool {
        self.total == 0
    }

    /// Exit status under the given thresholds
    ///
    /// Only critical and high violations can fail a run.
    pub fn exit_status(&self, thresholds: &SeverityThresholds) -> ExitStatus {
        if self.count_severity(Severity::Critical) > thresholds.max_critical
            || self.count_severity(Severity::High) > thresholds.max_high
        {
            ExitStatus::ViolationsFound
        } else {
            ExitStatus::Clean
        }
    }
}
