//! Domain module - top-level entity categories of the corpus

use serde::{Deserialize, Serialize};
use std::fmt;

/// A top-level category of entity
///
/// Each domain owns a directory of documents and its own schema versions.
/// Cross-domain references address entities as `/<domain>/<slug>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// Substrate materials (metals, woods, composites, ...)
    Materials,

    /// Surface contaminants to be removed
    Contaminants,

    /// Chemical compounds produced or involved during processing
    Compounds,

    /// Machine parameter settings
    Settings,
}

impl Domain {
    /// Every known domain, in canonical order
    pub const ALL: [Domain; 4] = [
        Domain::Materials,
        Domain::Contaminants,
        Domain::Compounds,
        Domain::Settings,
    ];

    /// Get the domain name as a string (also its URL segment and directory name)
    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Materials => "materials",
            Domain::Contaminants => "contaminants",
            Domain::Compounds => "compounds",
            Domain::Settings => "settings",
        }
    }

    /// Parse a domain from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "materials" => Some(Domain::Materials),
            "contaminants" => Some(Domain::Contaminants),
            "compounds" => Some(Domain::Compounds),
            "settings" => Some(Domain::Settings),
            _ => None,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid domain: {}", s))
    }
}
