//! Schema registry - which fields each domain and version requires

use crate::GatekeeperError;
use meridian_domain::{Document, Domain, FieldPath, MismatchReason, SchemaVersion, MAX_CONFIDENCE};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

const DEFAULT_CONFIDENCE_THRESHOLD: u8 = 70;

fn default_confidence_threshold() -> u8 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

/// On-disk (TOML) form of the registry
///
/// ```toml
/// [domains.materials]
/// confidence_threshold = 70
/// latest = "2.0"
///
/// [[domains.materials.versions]]
/// version = "2.0"
/// fields = [
///     { path = "name", required = true },
///     { path = "chemicalFormula", aliases = ["formula"] },
/// ]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Schemas keyed by domain name
    #[serde(default)]
    pub domains: BTreeMap<String, DomainConfig>,
}

/// On-disk form of one domain's schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    /// Minimum passing confidence score
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: u8,

    /// Version applied to undeclared or unknown versions (highest if omitted)
    #[serde(default)]
    pub latest: Option<String>,

    /// Registered versions
    #[serde(default)]
    pub versions: Vec<VersionConfig>,
}

/// On-disk form of one schema version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    /// Version tag
    pub version: String,

    /// Declared fields
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// On-disk form of one field declaration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Canonical dotted path
    pub path: String,

    /// Whether documents must populate the field
    #[serde(default)]
    pub required: bool,

    /// Additional accepted names
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// One declared field with its alias set resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Canonical dotted path
    pub name: String,

    /// Whether documents must populate the field
    pub required: bool,

    /// Accepted alternative names, including the camelCase/snake_case counterpart
    pub aliases: Vec<String>,

    path: FieldPath,
    alias_paths: Vec<FieldPath>,
}

impl FieldSpec {
    /// Declare a field with explicit aliases
    pub fn new<I, A>(name: impl Into<String>, required: bool, aliases: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        let name = name.into();
        let mut resolved: Vec<String> = Vec::new();
        let counterpart = naming_counterpart(&name);
        for alias in aliases.into_iter().map(Into::into).chain(counterpart) {
            let alias = alias.trim().to_string();
            if !alias.is_empty() && alias != name && !resolved.contains(&alias) {
                resolved.push(alias);
            }
        }

        Self {
            path: FieldPath::parse(&name),
            alias_paths: resolved.iter().map(|a| FieldPath::parse(a)).collect(),
            name,
            required,
            aliases: resolved,
        }
    }

    /// Declare a required field
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, true, Vec::<String>::new())
    }

    /// Declare an optional field
    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name, false, Vec::<String>::new())
    }

    /// Canonical path
    pub fn path(&self) -> &FieldPath {
        &self.path
    }
}

/// All registered versions of one domain's schema
#[derive(Debug, Clone)]
pub struct DomainSchema {
    domain: Domain,
    confidence_threshold: u8,
    versions: BTreeMap<SchemaVersion, Vec<FieldSpec>>,
    latest: SchemaVersion,
}

impl DomainSchema {
    /// Build a domain schema
    ///
    /// # Errors
    /// Fails when no version is registered, when `latest` names an unregistered
    /// version, or when the threshold exceeds 100.
    pub fn new(
        domain: Domain,
        confidence_threshold: u8,
        versions: BTreeMap<SchemaVersion, Vec<FieldSpec>>,
        latest: Option<SchemaVersion>,
    ) -> Result<Self, GatekeeperError> {
        if confidence_threshold > MAX_CONFIDENCE {
            return Err(GatekeeperError::Config(format!(
                "Domain '{}': confidence_threshold {} exceeds {}",
                domain, confidence_threshold, MAX_CONFIDENCE
            )));
        }
        let latest = match latest {
            Some(version) if versions.contains_key(&version) => version,
            Some(version) => {
                return Err(GatekeeperError::Config(format!(
                    "Domain '{}': latest version '{}' is not registered",
                    domain, version
                )))
            }
            None => versions.keys().next_back().cloned().ok_or_else(|| {
                GatekeeperError::Config(format!("Domain '{}' has no schema versions", domain))
            })?,
        };

        Ok(Self {
            domain,
            confidence_threshold,
            versions,
            latest,
        })
    }

    /// Owning domain
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Minimum passing confidence score
    pub fn confidence_threshold(&self) -> u8 {
        self.confidence_threshold
    }

    /// Version applied when a document's version is undeclared or unknown
    pub fn latest(&self) -> &SchemaVersion {
        &self.latest
    }

    /// Registered versions, ascending
    pub fn versions(&self) -> impl Iterator<Item = &SchemaVersion> {
        self.versions.keys()
    }

    /// Fields of one version
    pub fn fields(&self, version: &SchemaVersion) -> Option<&[FieldSpec]> {
        self.versions.get(version).map(Vec::as_slice)
    }
}

/// The schema actually applied to one document
#[derive(Debug, Clone)]
pub struct ResolvedSchema<'a> {
    /// Domain the schema belongs to
    pub domain: Domain,

    /// Version applied
    pub version: &'a SchemaVersion,

    /// Fields of that version
    pub fields: &'a [FieldSpec],

    /// Minimum passing confidence score
    pub confidence_threshold: u8,

    /// Set when the declared version could not be used as-is
    pub fallback: Option<MismatchReason>,
}

/// How a declared field was found in a document
#[derive(Debug, Clone, PartialEq)]
pub enum FieldLookup<'a> {
    /// Populated under its canonical name
    Canonical(&'a Value),
    /// Populated only under an alias
    Alias {
        /// Alias the value was found under
        alias: &'a str,
        /// The value
        value: &'a Value,
    },
    /// Not populated
    Absent,
}

impl FieldLookup<'_> {
    /// Whether the field is populated under any accepted name
    pub fn is_present(&self) -> bool {
        !matches!(self, FieldLookup::Absent)
    }
}

/// Registry of schemas for every domain
///
/// Read-only after construction, so it can be shared across validation workers.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    domains: BTreeMap<Domain, DomainSchema>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            domains: BTreeMap::new(),
        }
    }

    /// Register (or replace) one domain's schema
    pub fn with_domain(mut self, schema: DomainSchema) -> Self {
        self.domains.insert(schema.domain, schema);
        self
    }

    /// Build a registry from its on-disk form
    ///
    /// # Errors
    /// Fails on unknown domain names, duplicate versions, or any error from
    /// [`DomainSchema::new`].
    pub fn from_config(config: RegistryConfig) -> Result<Self, GatekeeperError> {
        let mut registry = Self::new();
        for (name, domain_config) in config.domains {
            let domain = Domain::parse(&name)
                .ok_or_else(|| GatekeeperError::Config(format!("Unknown domain '{}'", name)))?;

            let mut versions = BTreeMap::new();
            for version_config in domain_config.versions {
                let version = SchemaVersion::new(version_config.version);
                let fields = version_config
                    .fields
                    .into_iter()
                    .map(|f| FieldSpec::new(f.path, f.required, f.aliases))
                    .collect();
                if versions.insert(version.clone(), fields).is_some() {
                    return Err(GatekeeperError::Config(format!(
                        "Domain '{}': version '{}' is declared twice",
                        domain, version
                    )));
                }
            }

            let latest = domain_config.latest.map(SchemaVersion::new);
            let schema =
                DomainSchema::new(domain, domain_config.confidence_threshold, versions, latest)?;
            registry = registry.with_domain(schema);
        }
        Ok(registry)
    }

    /// Parse a registry from TOML text
    pub fn from_toml_str(s: &str) -> Result<Self, GatekeeperError> {
        let config: RegistryConfig = toml::from_str(s)?;
        Self::from_config(config)
    }

    /// Load a registry from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GatekeeperError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// The schema set shipped with Meridian
    pub fn builtin() -> Self {
        let common = |extra: Vec<FieldSpec>| -> Vec<FieldSpec> {
            let mut fields = vec![
                FieldSpec::required("id"),
                FieldSpec::required("name"),
                FieldSpec::optional("schemaVersion"),
            ];
            fields.extend(extra);
            fields
        };

        let materials_v1 = common(vec![
            FieldSpec::required("category"),
            FieldSpec::optional("subcategory"),
            FieldSpec::optional("description"),
            FieldSpec::optional("properties"),
        ]);
        let materials_v2 = common(vec![
            FieldSpec::required("category"),
            FieldSpec::optional("subcategory"),
            FieldSpec::new("description", false, ["summary"]),
            FieldSpec::optional("properties"),
            FieldSpec::optional("relationships"),
            FieldSpec::optional("images"),
        ]);
        let contaminants = common(vec![
            FieldSpec::required("category"),
            FieldSpec::optional("description"),
            FieldSpec::optional("appearance"),
            FieldSpec::optional("relationships"),
        ]);
        let compounds = common(vec![
            FieldSpec::required("chemicalFormula"),
            FieldSpec::optional("casNumber"),
            FieldSpec::optional("hazards"),
            FieldSpec::optional("relationships"),
        ]);
        let settings = common(vec![
            FieldSpec::required("machineSettings"),
            FieldSpec::optional("description"),
            FieldSpec::optional("relationships"),
        ]);

        let schema = |domain: Domain, versions: Vec<(&str, Vec<FieldSpec>)>| {
            let versions: BTreeMap<SchemaVersion, Vec<FieldSpec>> = versions
                .into_iter()
                .map(|(v, fields)| (SchemaVersion::new(v), fields))
                .collect();
            let latest = versions
                .keys()
                .next_back()
                .cloned()
                .unwrap_or_else(|| SchemaVersion::new("1.0"));
            DomainSchema {
                domain,
                confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
                versions,
                latest,
            }
        };

        Self::new()
            .with_domain(schema(
                Domain::Materials,
                vec![("1.0", materials_v1), ("2.0", materials_v2)],
            ))
            .with_domain(schema(Domain::Contaminants, vec![("1.0", contaminants)]))
            .with_domain(schema(Domain::Compounds, vec![("1.0", compounds)]))
            .with_domain(schema(Domain::Settings, vec![("1.0", settings)]))
    }

    /// Schema of one domain
    pub fn domain(&self, domain: Domain) -> Option<&DomainSchema> {
        self.domains.get(&domain)
    }

    /// Registered domains
    pub fn domains(&self) -> impl Iterator<Item = Domain> + '_ {
        self.domains.keys().copied()
    }

    /// Fields of an exact domain and version
    pub fn fields(&self, domain: Domain, version: &SchemaVersion) -> Option<&[FieldSpec]> {
        self.domains.get(&domain)?.fields(version)
    }

    /// Pick the schema for a document's declared version
    ///
    /// Undeclared and unknown versions fall back to the domain's latest
    /// version and say so in [`ResolvedSchema::fallback`].
    ///
    /// # Errors
    /// Returns [`GatekeeperError::UnknownDomain`] if the domain has no schema.
    pub fn resolve(
        &self,
        domain: Domain,
        declared: Option<&SchemaVersion>,
    ) -> Result<ResolvedSchema<'_>, GatekeeperError> {
        let schema = self
            .domains
            .get(&domain)
            .ok_or(GatekeeperError::UnknownDomain(domain))?;

        if let Some((version, fields)) = declared.and_then(|v| schema.versions.get_key_value(v)) {
            return Ok(ResolvedSchema {
                domain,
                version,
                fields,
                confidence_threshold: schema.confidence_threshold,
                fallback: None,
            });
        }

        let (version, fields) = schema
            .versions
            .get_key_value(&schema.latest)
            .ok_or(GatekeeperError::UnknownDomain(domain))?;
        let reason = match declared {
            Some(_) => MismatchReason::UnknownVersion,
            None => MismatchReason::Undeclared,
        };

        Ok(ResolvedSchema {
            domain,
            version,
            fields,
            confidence_threshold: schema.confidence_threshold,
            fallback: Some(reason),
        })
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Whether a value counts as populated
///
/// Null, blank strings, and empty sequences or mappings do not.
pub fn is_populated(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_populated(&tagged.value),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Find a declared field in a document, canonical name first
pub fn lookup_field<'a>(document: &'a Document, spec: &'a FieldSpec) -> FieldLookup<'a> {
    if let Some(value) = document.get(&spec.path).filter(|v| is_populated(v)) {
        return FieldLookup::Canonical(value);
    }
    for (alias, path) in spec.aliases.iter().zip(&spec.alias_paths) {
        if let Some(value) = document.get(path).filter(|v| is_populated(v)) {
            return FieldLookup::Alias { alias, value };
        }
    }
    FieldLookup::Absent
}

fn naming_counterpart(path: &str) -> Option<String> {
    let converted: Vec<String> = path
        .split('.')
        .map(|segment| {
            if segment.trim_start_matches('_').contains('_') {
                snake_to_camel(segment)
            } else {
                camel_to_snake(segment)
            }
        })
        .collect();
    let converted = converted.join(".");
    (converted != path).then_some(converted)
}

fn camel_to_snake(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 4);
    for (i, ch) in segment.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if i > 0 && !out.ends_with('_') {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

fn snake_to_camel(segment: &str) -> String {
    let body = segment.trim_start_matches('_');
    let prefix = &segment[..segment.len() - body.len()];
    let mut out = String::from(prefix);
    for (i, word) in body.split('_').filter(|w| !w.is_empty()).enumerate() {
        if i == 0 {
            out.push_str(word);
        } else {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                out.push(first.to_ascii_uppercase());
                out.push_str(chars.as_str());
            }
        }
    }
    out
}
