//! Completeness scoring

use crate::registry::{lookup_field, FieldLookup, ResolvedSchema};
use crate::ValidationConfig;
use meridian_domain::document::SCHEMA_VERSION_FIELD;
use meridian_domain::{
    Document, DocumentScore, Domain, FieldCoverage, FieldPath, MismatchReason, Violation,
    ViolationKind, MAX_CONFIDENCE,
};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Everything the scorer learned about one document
#[derive(Debug, Clone)]
pub struct Assessment {
    /// Confidence verdict
    pub score: DocumentScore,

    /// Missing required fields and schema mismatches
    pub violations: Vec<Violation>,

    /// Presence of each declared field, for coverage
    pub presence: Vec<(String, bool)>,
}

/// Per-domain, per-field coverage over a set of documents
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageTable {
    domains: BTreeMap<Domain, BTreeMap<String, FieldCoverage>>,
}

impl CoverageTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one document's presence for a field
    pub fn record(&mut self, domain: Domain, field: &str, present: bool) {
        self.domains
            .entry(domain)
            .or_default()
            .entry(field.to_string())
            .or_default()
            .record(present);
    }

    /// Coverage of one field
    pub fn get(&self, domain: Domain, field: &str) -> Option<&FieldCoverage> {
        self.domains.get(&domain)?.get(field)
    }

    /// All fields of one domain
    pub fn domain(&self, domain: Domain) -> Option<&BTreeMap<String, FieldCoverage>> {
        self.domains.get(&domain)
    }

    /// Every row, ordered by domain then field
    pub fn iter(&self) -> impl Iterator<Item = (Domain, &str, &FieldCoverage)> {
        self.domains.iter().flat_map(|(domain, fields)| {
            fields
                .iter()
                .map(move |(field, coverage)| (*domain, field.as_str(), coverage))
        })
    }

    /// Whether nothing has been recorded
    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

/// Scores documents against their resolved schema
pub struct CompletenessScorer {
    config: ValidationConfig,
}

impl CompletenessScorer {
    /// Create a new scorer with the given configuration
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Check a document's declared fields and compute its confidence score
    pub fn assess(&self, document: &Document, schema: &ResolvedSchema<'_>) -> Assessment {
        let key = document.key();
        let mut violations = Vec::new();
        let mut presence = Vec::with_capacity(schema.fields.len());
        let mut missing_required = BTreeSet::new();
        let mut missing_optional = BTreeSet::new();
        let mut mismatches = 0usize;

        if let Some(reason) = &schema.fallback {
            mismatches += 1;
            violations.push(Violation::new(
                &key,
                FieldPath::parse(SCHEMA_VERSION_FIELD),
                ViolationKind::SchemaVersionMismatch {
                    declared: document.schema_version.as_ref().map(|v| v.to_string()),
                    resolved: schema.version.to_string(),
                    reason: reason.clone(),
                },
            ));
        }

        for spec in schema.fields {
            let found = lookup_field(document, spec);
            presence.push((spec.name.clone(), found.is_present()));
            match found {
                FieldLookup::Canonical(_) => {}
                FieldLookup::Alias { alias, .. } => {
                    mismatches += 1;
                    violations.push(Violation::new(
                        &key,
                        FieldPath::parse(alias),
                        ViolationKind::SchemaVersionMismatch {
                            declared: document.schema_version.as_ref().map(|v| v.to_string()),
                            resolved: schema.version.to_string(),
                            reason: MismatchReason::AliasedField {
                                alias: alias.to_string(),
                                canonical: spec.name.clone(),
                            },
                        },
                    ));
                }
                FieldLookup::Absent if spec.required => {
                    missing_required.insert(spec.name.clone());
                    violations.push(Violation::new(
                        &key,
                        spec.path().clone(),
                        ViolationKind::MissingRequiredField {
                            field: spec.name.clone(),
                        },
                    ));
                }
                FieldLookup::Absent => {
                    missing_optional.insert(spec.name.clone());
                }
            }
        }

        let confidence_score = self.confidence(
            self.base_confidence(document),
            missing_required.len(),
            missing_optional.len(),
            mismatches,
        );

        Assessment {
            score: DocumentScore {
                key,
                schema_version: schema.version.clone(),
                missing_required_fields: missing_required,
                missing_optional_fields: missing_optional,
                confidence_score,
                threshold: schema.confidence_threshold,
            },
            violations,
            presence,
        }
    }

    /// Starting score before penalties
    ///
    /// Documents carrying provenance (`_metadata.confidence`) start from that
    /// value, clamped to `0..=100`; everything else starts from 100.
    pub fn base_confidence(&self, document: &Document) -> u8 {
        let declared = document
            .fields
            .get(self.config.provenance_field.as_str())
            .and_then(Value::as_mapping)
            .and_then(|meta| meta.get(self.config.provenance_key.as_str()))
            .and_then(|value| match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            });

        match declared {
            Some(value) if value.is_finite() => {
                value.round().clamp(0.0, MAX_CONFIDENCE as f64) as u8
            }
            _ => MAX_CONFIDENCE,
        }
    }

    /// Apply penalties to a base score
    ///
    /// Any missing required field also caps the result at the configured
    /// ceiling, so such a document never passes a threshold above it. Only
    /// those documents can reach 0: a document with every required field
    /// bottoms out at 1, keeping it strictly above the same document with a
    /// required field removed.
    pub fn confidence(
        &self,
        base: u8,
        missing_required: usize,
        missing_optional: usize,
        mismatches: usize,
    ) -> u8 {
        let penalty = |count: usize, weight: u8| (count as u64).saturating_mul(weight as u64);
        let total = penalty(missing_required, self.config.required_field_penalty)
            .saturating_add(penalty(missing_optional, self.config.optional_field_penalty))
            .saturating_add(penalty(mismatches, self.config.schema_mismatch_penalty));

        let score = (base.min(MAX_CONFIDENCE) as u64).saturating_sub(total) as u8;
        if missing_required > 0 {
            score.min(self.config.required_field_ceiling)
        } else {
            score.max(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaRegistry;
    use meridian_domain::{SchemaVersion, ViolationCode};
    use serde_yaml::Mapping;

    fn scorer() -> CompletenessScorer {
        CompletenessScorer::new(ValidationConfig::default())
    }

    fn doc(domain: Domain, yaml: &str) -> Document {
        let fields: Mapping = serde_yaml::from_str(yaml).unwrap();
        Document::from_fields(domain, fields, None).unwrap()
    }

    #[test]
    fn test_complete_document_scores_full() {
        let registry = SchemaRegistry::builtin();
        let document = doc(
            Domain::Compounds,
            "id: co2\nname: Carbon Dioxide\nschemaVersion: '1.0'\nchemicalFormula: CO2\ncasNumber: 124-38-9\nhazards: [asphyxiant]\nrelationships: {produced_by: []}\n",
        );
        let version = SchemaVersion::new("1.0");
        let schema = registry.resolve(Domain::Compounds, Some(&version)).unwrap();

        let assessment = scorer().assess(&document, &schema);
        assert_eq!(assessment.score.confidence_score, 100);
        assert!(assessment.violations.is_empty());
        assert!(assessment.score.passed());
    }

    #[test]
    fn test_missing_required_field() {
        let registry = SchemaRegistry::builtin();
        let document = doc(Domain::Compounds, "id: co2\nname: Carbon Dioxide\nschemaVersion: '1.0'\n");
        let version = SchemaVersion::new("1.0");
        let schema = registry.resolve(Domain::Compounds, Some(&version)).unwrap();

        let assessment = scorer().assess(&document, &schema);
        assert!(assessment
            .score
            .missing_required_fields
            .contains("chemicalFormula"));
        assert!(!assessment.score.passed());
        assert!(assessment.score.confidence_score <= 49);
        let missing: Vec<_> = assessment
            .violations
            .iter()
            .filter(|v| v.code() == ViolationCode::MissingRequiredField)
            .collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].path.to_string(), "chemicalFormula");
    }

    #[test]
    fn test_required_always_scores_below_optional() {
        let scorer = scorer();
        for base in [0, 1, 5, 20, 49, 50, 74, 100] {
            for optional in 0..25 {
                for mismatches in 0..12 {
                    let without = scorer.confidence(base, 0, optional, mismatches);
                    let with = scorer.confidence(base, 1, optional, mismatches);
                    assert!(
                        with < without,
                        "base {} optional {} mismatches {}: {} vs {}",
                        base,
                        optional,
                        mismatches,
                        with,
                        without
                    );
                    assert!(with <= 49);
                }
            }
        }
    }

    #[test]
    fn test_score_floor() {
        let scorer = scorer();
        assert_eq!(scorer.confidence(10, 0, 4, 0), 1);
        assert_eq!(scorer.confidence(0, 0, 0, 0), 1);
        assert_eq!(scorer.confidence(10, 1, 4, 0), 0);
        assert_eq!(scorer.confidence(100, 4, 0, 0), 0);
    }

    #[test]
    fn test_provenance_combines_with_penalties() {
        let registry = SchemaRegistry::builtin();
        let version = SchemaVersion::new("2.0");
        let schema = registry.resolve(Domain::Materials, Some(&version)).unwrap();

        // subcategory, properties and images missing: 82 - 3 * 5
        let document = doc(
            Domain::Materials,
            "id: steel\nname: Steel\nschemaVersion: '2.0'\ncategory: metal\ndescription: Alloy\nrelationships: {found: []}\n_metadata:\n  confidence: 82\n",
        );
        let assessment = scorer().assess(&document, &schema);
        assert_eq!(assessment.score.missing_optional_fields.len(), 3);
        assert_eq!(assessment.score.confidence_score, 67);
        assert!(!assessment.score.passed());
    }

    #[test]
    fn test_low_provenance_keeps_required_ordering() {
        let registry = SchemaRegistry::builtin();
        let version = SchemaVersion::new("2.0");
        let schema = registry.resolve(Domain::Materials, Some(&version)).unwrap();

        let complete = doc(
            Domain::Materials,
            "id: steel\nname: Steel\nschemaVersion: '2.0'\ncategory: metal\n_metadata:\n  confidence: 20\n",
        );
        let missing = doc(
            Domain::Materials,
            "id: steel\nname: Steel\nschemaVersion: '2.0'\n_metadata:\n  confidence: 20\n",
        );

        let complete = scorer().assess(&complete, &schema).score;
        let missing = scorer().assess(&missing, &schema).score;
        assert_eq!(complete.confidence_score, 1);
        assert_eq!(missing.confidence_score, 0);
        assert!(missing.confidence_score < complete.confidence_score);
        assert!(missing.missing_required_fields.contains("category"));
    }

    #[test]
    fn test_undeclared_version_is_advisory() {
        let registry = SchemaRegistry::builtin();
        let document = doc(Domain::Compounds, "id: co2\nname: CO2\nchemicalFormula: CO2\n");
        let schema = registry.resolve(Domain::Compounds, None).unwrap();

        let assessment = scorer().assess(&document, &schema);
        let codes: Vec<_> = assessment.violations.iter().map(|v| v.code()).collect();
        assert_eq!(codes, vec![ViolationCode::SchemaVersionMismatch]);
        assert_eq!(assessment.violations[0].path.to_string(), "schemaVersion");
        assert!(assessment.score.missing_required_fields.is_empty());
    }

    #[test]
    fn test_aliased_field_counts_as_present() {
        let registry = SchemaRegistry::builtin();
        let document = doc(
            Domain::Compounds,
            "id: co2\nname: CO2\nschema_version: '1.0'\nchemical_formula: CO2\n",
        );
        let schema = registry
            .resolve(Domain::Compounds, document.schema_version.as_ref())
            .unwrap();

        let assessment = scorer().assess(&document, &schema);
        assert!(assessment.score.missing_required_fields.is_empty());
        let aliases: Vec<_> = assessment
            .violations
            .iter()
            .filter_map(|v| match &v.kind {
                ViolationKind::SchemaVersionMismatch {
                    reason: MismatchReason::AliasedField { alias, .. },
                    ..
                } => Some(alias.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(aliases, vec!["schema_version", "chemical_formula"]);
    }

    #[test]
    fn test_provenance_sets_base_score() {
        let scorer = scorer();
        let document = doc(Domain::Compounds, "id: co2\n_metadata:\n  confidence: 82\n");
        assert_eq!(scorer.base_confidence(&document), 82);

        let over = doc(Domain::Compounds, "id: co2\n_metadata:\n  confidence: 250\n");
        assert_eq!(scorer.base_confidence(&over), 100);

        let none = doc(Domain::Compounds, "id: co2\n");
        assert_eq!(scorer.base_confidence(&none), 100);
    }

    #[test]
    fn test_coverage_table() {
        let mut table = CoverageTable::new();
        for i in 0..8 {
            table.record(Domain::Materials, "density", i < 3);
        }
        table.record(Domain::Compounds, "name", true);

        let coverage = table.get(Domain::Materials, "density").unwrap();
        assert_eq!(coverage.present_count, 3);
        assert_eq!(coverage.total_count, 8);
        assert!((coverage.coverage_ratio() - 0.375).abs() < f64::EPSILON);
        assert_eq!(table.iter().count(), 2);
    }
}
