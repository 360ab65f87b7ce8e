//! Configuration for repair runs

use serde::{Deserialize, Serialize};

/// Configuration for the Janitor
///
/// # Examples
///
/// ```
/// use meridian_janitor::RepairConfig;
///
/// let config = RepairConfig {
///     workers: 4,
///     repair_slug_mismatch: false,
///     ..RepairConfig::default()
/// };
/// assert!(config.normalize_artifacts);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairConfig {
    /// Dry-run mode: compute the result without saving anything
    /// Default: false
    #[serde(default)]
    pub dry_run: bool,

    /// Worker threads for per-document repair (0 = one per core)
    /// Default: 0
    #[serde(default)]
    pub workers: usize,

    /// Replace slugs that disagree with their URL
    /// Default: true (the URL is authoritative; originals go to the review log)
    #[serde(default = "default_true")]
    pub repair_slug_mismatch: bool,

    /// Re-save documents loaded from legacy serialization tags
    /// Default: true
    #[serde(default = "default_true")]
    pub normalize_artifacts: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RepairConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            workers: 0,
            repair_slug_mismatch: true,
            normalize_artifacts: true,
        }
    }
}

impl RepairConfig {
    /// Default configuration in dry-run mode
    pub fn dry_run() -> Self {
        Self {
            dry_run: true,
            ..Self::default()
        }
    }
}
