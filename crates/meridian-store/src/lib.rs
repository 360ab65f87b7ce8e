//! Meridian Storage Layer
//!
//! Implements the `DocumentStore` trait over a directory of YAML documents.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   materials/**/*.yaml
//!   contaminants/**/*.yaml
//!   compounds/**/*.yaml
//!   settings/**/*.yaml
//! ```
//!
//! One document per file. Key order is preserved on load and save.
//!
//! # Guarantees
//!
//! - Loading fails as a whole if any file cannot be read or is not valid YAML
//! - Structurally unusable documents are isolated as `MalformedDocument` findings
//! - Legacy `!!python/...` tags are normalized to plain mappings on load
//!   and never written back
//! - Saves go through a temp file and an atomic rename, so a failed or
//!   interrupted save leaves the previous file untouched
//!
//! # Examples
//!
//! ```no_run
//! use meridian_domain::{Domain, DocumentStore};
//! use meridian_store::YamlStore;
//!
//! let store = YamlStore::open("content").unwrap();
//! let outcome = store.load(Domain::Materials).unwrap();
//! println!("{} materials", outcome.documents.len());
//! ```

#![warn(missing_docs)]

mod error;
pub mod normalize;
mod store;

pub use error::StoreError;
pub use store::YamlStore;
