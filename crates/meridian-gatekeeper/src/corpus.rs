//! A loaded corpus snapshot

use crate::EntityIndex;
use meridian_domain::{Document, DocumentStore, Domain, Violation};

/// Every document of a run, plus what could not be loaded
///
/// The entity index is built once here and stays fixed for the whole pass.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    rejected: Vec<Violation>,
    index: EntityIndex,
}

impl Corpus {
    /// Load the given domains from a store
    ///
    /// # Errors
    /// Propagates the store's error for any domain that cannot be read.
    pub fn load<S: DocumentStore>(store: &S, domains: &[Domain]) -> Result<Self, S::Error> {
        let mut documents = Vec::new();
        let mut rejected = Vec::new();
        for &domain in domains {
            let outcome = store.load(domain)?;
            documents.extend(outcome.documents);
            rejected.extend(outcome.rejected);
        }

        tracing::debug!(
            "Loaded corpus: {} documents, {} rejected",
            documents.len(),
            rejected.len()
        );
        Ok(Self::from_documents(documents).with_rejected(rejected))
    }

    /// Build a corpus from documents already in memory
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let index = EntityIndex::build(&documents);
        Self {
            documents,
            rejected: Vec::new(),
            index,
        }
    }

    /// Attach documents that failed structural checks while loading
    pub fn with_rejected(mut self, rejected: Vec<Violation>) -> Self {
        self.rejected.extend(rejected);
        self
    }

    /// All usable documents
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// Usable documents of one domain
    pub fn documents_in(&self, domain: Domain) -> impl Iterator<Item = &Document> {
        self.documents.iter().filter(move |d| d.domain == domain)
    }

    /// `MalformedDocument` violations raised while loading
    pub fn rejected(&self) -> &[Violation] {
        &self.rejected
    }

    /// Entity index snapshot
    pub fn index(&self) -> &EntityIndex {
        &self.index
    }

    /// Number of usable documents
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether there are no usable documents
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
