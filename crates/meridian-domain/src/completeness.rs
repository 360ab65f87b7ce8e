//! Completeness records - field coverage and per-document confidence

use crate::{DocumentKey, SchemaVersion};
use serde::Serialize;
use std::collections::BTreeSet;

/// Upper bound of every confidence score
pub const MAX_CONFIDENCE: u8 = 100;

/// How many documents of a domain populate one field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldCoverage {
    /// Documents populating the field
    pub present_count: usize,
    /// Documents considered
    pub total_count: usize,
}

impl FieldCoverage {
    /// Count one document
    pub fn record(&mut self, present: bool) {
        self.total_count += 1;
        if present {
            self.present_count += 1;
        }
    }

    /// Fraction of documents populating the field (0.0 when there are none)
    pub fn coverage_ratio(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.present_count as f64 / self.total_count as f64
        }
    }
}

/// Completeness verdict for a single document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentScore {
    /// Scored document
    pub key: DocumentKey,

    /// Schema version the document was scored against
    pub schema_version: SchemaVersion,

    /// Required fields the document does not populate
    pub missing_required_fields: BTreeSet<String>,

    /// Optional fields the document does not populate
    pub missing_optional_fields: BTreeSet<String>,

    /// Confidence score in `0..=100`
    pub confidence_score: u8,

    /// Minimum score the domain demands
    pub threshold: u8,
}

impl DocumentScore {
    /// Whether the document passes the completeness gate
    ///
    /// Any missing required field fails regardless of score.
    pub fn passed(&self) -> bool {
        self.missing_required_fields.is_empty() && self.confidence_score >= self.threshold
    }
}
