//! The validation pass

use crate::completeness::{CompletenessScorer, CoverageTable};
use crate::{
    Corpus, EntityIndex, GatekeeperError, RelationshipLinker, SchemaRegistry, ValidationConfig,
};
use meridian_domain::{
    Document, DocumentKey, DocumentScore, Domain, Violation, ViolationCode, ViolationKind,
};
use rayon::prelude::*;

/// Result of validating a corpus (or one domain of it)
#[derive(Debug, Clone, Default)]
pub struct ValidationPass {
    /// All violations, ordered by domain, entity, path and code
    pub violations: Vec<Violation>,

    /// One score per checked document
    pub scores: Vec<DocumentScore>,

    /// Field coverage per domain
    pub coverage: CoverageTable,

    /// Number of documents checked (rejected documents excluded)
    pub documents_checked: usize,
}

impl ValidationPass {
    /// Number of violations with a given code
    pub fn count(&self, code: ViolationCode) -> usize {
        self.violations.iter().filter(|v| v.code() == code).count()
    }

    /// Violations against one document
    pub fn violations_for<'a>(
        &'a self,
        key: &'a DocumentKey,
    ) -> impl Iterator<Item = &'a Violation> {
        self.violations
            .iter()
            .filter(move |v| v.domain == key.domain && v.entity_id == key.entity_id)
    }

    /// Number of violations the repairer can fix
    pub fn repairable(&self) -> usize {
        self.violations
            .iter()
            .filter(|v| v.code().is_auto_repairable())
            .count()
    }

    /// Whether no violations were found
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Findings for one document
struct DocumentFindings {
    violations: Vec<Violation>,
    score: Option<DocumentScore>,
    presence: Vec<(String, bool)>,
}

/// The Gatekeeper validates documents against the schema registry and the
/// entity index
pub struct Gatekeeper {
    registry: SchemaRegistry,
    config: ValidationConfig,
    scorer: CompletenessScorer,
}

impl Gatekeeper {
    /// Create a new Gatekeeper with the given registry and configuration
    pub fn new(registry: SchemaRegistry, config: ValidationConfig) -> Self {
        let scorer = CompletenessScorer::new(config.clone());
        Self {
            registry,
            config,
            scorer,
        }
    }

    /// Create a Gatekeeper with the built-in registry and default configuration
    pub fn default_config() -> Self {
        Self::new(SchemaRegistry::builtin(), ValidationConfig::default())
    }

    /// The schema registry in use
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// Validate every document in scope
    ///
    /// Documents are checked in parallel against a fixed entity index, so the
    /// result does not depend on scheduling. `scope = None` checks every domain.
    ///
    /// # Errors
    /// Returns [`GatekeeperError::UnknownDomain`] if a document's domain has no
    /// registered schema.
    pub fn validate(
        &self,
        corpus: &Corpus,
        scope: Option<Domain>,
    ) -> Result<ValidationPass, GatekeeperError> {
        let in_scope = |domain: Domain| scope.map_or(true, |s| s == domain);

        let documents: Vec<&Document> = corpus
            .documents()
            .iter()
            .filter(|d| in_scope(d.domain))
            .collect();

        let findings = documents
            .par_iter()
            .map(|document| self.validate_document(document, corpus.index()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut pass = ValidationPass {
            documents_checked: documents.len(),
            ..ValidationPass::default()
        };
        pass.violations.extend(
            corpus
                .rejected()
                .iter()
                .filter(|v| in_scope(v.domain))
                .cloned(),
        );

        for (document, found) in documents.iter().zip(findings) {
            for (field, present) in &found.presence {
                pass.coverage.record(document.domain, field, *present);
            }
            pass.violations.extend(found.violations);
            pass.scores.extend(found.score);
        }

        pass.violations.sort_by(|a, b| {
            (a.domain, &a.entity_id, &a.path, a.code())
                .cmp(&(b.domain, &b.entity_id, &b.path, b.code()))
        });
        pass.scores.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::info!(
            "Validated {} documents: {} violations ({} auto-repairable)",
            pass.documents_checked,
            pass.violations.len(),
            pass.repairable()
        );
        Ok(pass)
    }

    /// Validate one document
    fn validate_document(
        &self,
        document: &Document,
        index: &EntityIndex,
    ) -> Result<DocumentFindings, GatekeeperError> {
        let key = document.key();
        let mut findings = DocumentFindings {
            violations: Vec::new(),
            score: None,
            presence: Vec::new(),
        };

        // 1. Legacy serialization tags normalized at load time
        findings
            .violations
            .extend(document.artifacts.iter().map(|artifact| {
                Violation::new(
                    &key,
                    artifact.path.clone(),
                    ViolationKind::SerializationArtifact {
                        tag: artifact.tag.clone(),
                    },
                )
            }));

        // 2. Relationship entries
        if self.config.validate_relationships {
            findings
                .violations
                .extend(RelationshipLinker::new(index).check(document));
        }

        // 3. Schema completeness
        if self.config.validate_completeness {
            let schema = self
                .registry
                .resolve(document.domain, document.schema_version.as_ref())?;
            let assessment = self.scorer.assess(document, &schema);
            findings.violations.extend(assessment.violations);
            findings.presence = assessment.presence;
            findings.score = Some(assessment.score);
        }

        Ok(findings)
    }
}
