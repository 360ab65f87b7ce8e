//! YAML-directory implementation of `DocumentStore`

use crate::normalize::{normalize_value, rewrite_legacy_tags};
use crate::StoreError;
use meridian_domain::{
    Document, DocumentKey, DocumentStore, Domain, FieldPath, LoadOutcome, Violation, ViolationKind,
};
use rayon::prelude::*;
use serde_yaml::Value;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Directory-backed document store
///
/// Each domain lives in `<root>/<domain>/`; every `.yaml`/`.yml` file below it
/// is one document. Files are parsed on the rayon pool; results keep the
/// sorted path order so loads are deterministic.
#[derive(Debug, Clone)]
pub struct YamlStore {
    root: PathBuf,
    parallel: bool,
}

/// Outcome of parsing a single file
enum Parsed {
    Document(Box<Document>),
    Rejected(Box<Violation>),
}

impl YamlStore {
    /// Open a store rooted at `root`
    ///
    /// # Errors
    /// Returns `StoreError::InvalidRoot` if `root` is not an existing directory.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(StoreError::InvalidRoot(root));
        }
        Ok(Self {
            root,
            parallel: true,
        })
    }

    /// Parse files on the calling thread only
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Corpus root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a domain's documents
    pub fn domain_dir(&self, domain: Domain) -> PathBuf {
        self.root.join(domain.as_str())
    }

    /// File a document is (or will be) stored in
    pub fn document_path(&self, document: &Document) -> PathBuf {
        match &document.origin {
            Some(origin) => origin.clone(),
            None => self
                .domain_dir(document.domain)
                .join(format!("{}.yaml", document.entity_id)),
        }
    }

    /// All document files of a domain, sorted by path
    fn discover(&self, domain: Domain) -> Result<Vec<PathBuf>, StoreError> {
        let dir = self.domain_dir(domain);
        if !dir.exists() {
            tracing::debug!("No directory for domain {} at {}", domain, dir.display());
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir).follow_links(false) {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.clone());
                StoreError::CorpusRead {
                    path,
                    source: e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("directory walk failed")),
                }
            })?;
            if entry.file_type().is_file() && is_yaml(entry.path()) {
                files.push(entry.into_path());
            }
        }
        files.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
        Ok(files)
    }

    fn parse_file(domain: Domain, path: &Path) -> Result<Parsed, StoreError> {
        let raw = fs::read_to_string(path).map_err(|source| StoreError::CorpusRead {
            path: path.to_path_buf(),
            source,
        })?;
        let text = rewrite_legacy_tags(&raw);
        let value: Value = serde_yaml::from_str(&text).map_err(|source| StoreError::CorpusParse {
            path: path.to_path_buf(),
            source,
        })?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let reject = |reason: String| {
            let key = DocumentKey::new(domain, stem.clone());
            Ok(Parsed::Rejected(Box::new(Violation::new(
                &key,
                FieldPath::root(),
                ViolationKind::MalformedDocument {
                    reason: format!("{} ({})", reason, path.display()),
                },
            ))))
        };

        // A legacy-tagged root unwraps to a mapping here
        let mut artifacts = Vec::new();
        let fields = match normalize_value(value, &FieldPath::root(), &mut artifacts) {
            Value::Mapping(map) => map,
            Value::Null => return reject("document is empty".to_string()),
            _ => return reject("top level is not a mapping".to_string()),
        };
        match Document::from_fields(domain, fields, Some(&stem)) {
            Ok(mut document) => {
                if !artifacts.is_empty() {
                    tracing::debug!(
                        "Normalized {} legacy tag(s) in {}",
                        artifacts.len(),
                        path.display()
                    );
                }
                document.artifacts = artifacts;
                Ok(Parsed::Document(Box::new(document.with_origin(path.to_path_buf()))))
            }
            Err(reason) => reject(reason),
        }
    }
}

impl DocumentStore for YamlStore {
    type Error = StoreError;

    fn load(&self, domain: Domain) -> Result<LoadOutcome, StoreError> {
        let files = self.discover(domain)?;
        tracing::debug!("Loading {} {} document(s)", files.len(), domain);

        let parsed: Vec<Parsed> = if self.parallel {
            files
                .par_iter()
                .map(|path| Self::parse_file(domain, path))
                .collect::<Result<_, _>>()?
        } else {
            files
                .iter()
                .map(|path| Self::parse_file(domain, path))
                .collect::<Result<_, _>>()?
        };

        let mut outcome = LoadOutcome::default();
        let mut seen: HashMap<String, PathBuf> = HashMap::new();
        for item in parsed {
            match item {
                Parsed::Document(document) => {
                    let origin = document.origin.clone().unwrap_or_default();
                    if let Some(first) = seen.get(document.entity_id.as_str()) {
                        outcome.rejected.push(Violation::new(
                            &document.key(),
                            FieldPath::root(),
                            ViolationKind::MalformedDocument {
                                reason: format!(
                                    "duplicate entity id ({} also defined in {})",
                                    origin.display(),
                                    first.display()
                                ),
                            },
                        ));
                        continue;
                    }
                    seen.insert(document.entity_id.as_str().to_string(), origin);
                    outcome.documents.push(*document);
                }
                Parsed::Rejected(violation) => outcome.rejected.push(*violation),
            }
        }

        tracing::info!(
            "Loaded {} {} document(s), {} rejected",
            outcome.documents.len(),
            domain,
            outcome.rejected.len()
        );
        Ok(outcome)
    }

    fn save(&self, document: &Document) -> Result<(), StoreError> {
        let path = self.document_path(document);
        let text = serde_yaml::to_string(&document.fields).map_err(|source| StoreError::Encode {
            path: path.clone(),
            source,
        })?;

        let write_err = |source: std::io::Error| StoreError::CorpusWrite {
            path: path.clone(),
            source,
        };
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone());
        fs::create_dir_all(&dir).map_err(write_err)?;

        // Temp file in the same directory so the rename stays on one filesystem
        let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        tmp.write_all(text.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(&path).map_err(|e| write_err(e.error))?;

        tracing::debug!("Saved {} to {}", document.key(), path.display());
        Ok(())
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}
