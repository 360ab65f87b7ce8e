//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the data model and
//! infrastructure. Implementations live in other crates.

use crate::{Document, Domain, Violation};

/// Documents loaded for one domain
#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    /// Usable documents
    pub documents: Vec<Document>,

    /// Documents that parsed but could not be used, as `MalformedDocument` findings
    pub rejected: Vec<Violation>,
}

/// Trait for loading and saving corpus documents
///
/// Implemented by the infrastructure layer (meridian-store). Both operations
/// take `&self` so one store can serve a pool of repair workers.
pub trait DocumentStore {
    /// Error type for store operations
    type Error;

    /// Load every document of a domain
    ///
    /// Fails if any file cannot be read or parsed.
    fn load(&self, domain: Domain) -> Result<LoadOutcome, Self::Error>;

    /// Persist one document
    ///
    /// On failure the previous on-disk content must be left untouched.
    fn save(&self, document: &Document) -> Result<(), Self::Error>;
}
