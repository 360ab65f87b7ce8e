//! Gatekeeper configuration

use serde::{Deserialize, Serialize};

/// Configuration for validation and scoring rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Enable relationship entry checks (slug, URL, reference resolution)
    pub validate_relationships: bool,

    /// Enable schema completeness checks
    pub validate_completeness: bool,

    /// Penalty per missing optional field
    pub optional_field_penalty: u8,

    /// Penalty per schema version mismatch
    pub schema_mismatch_penalty: u8,

    /// Penalty per missing required field
    pub required_field_penalty: u8,

    /// Highest score a document with a missing required field can get
    pub required_field_ceiling: u8,

    /// Top-level mapping holding provenance metadata
    pub provenance_field: String,

    /// Key under `provenance_field` carrying a 0-100 base confidence
    pub provenance_key: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_relationships: true,
            validate_completeness: true,
            optional_field_penalty: 5,
            schema_mismatch_penalty: 10,
            required_field_penalty: 25,
            required_field_ceiling: 49,
            provenance_field: "_metadata".to_string(),
            provenance_key: "confidence".to_string(),
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (light penalties)
    pub fn permissive() -> Self {
        Self {
            optional_field_penalty: 2,
            schema_mismatch_penalty: 5,
            required_field_penalty: 20,
            required_field_ceiling: 59,
            ..Self::default()
        }
    }

    /// Create a strict configuration (heavy penalties)
    pub fn strict() -> Self {
        Self {
            optional_field_penalty: 10,
            schema_mismatch_penalty: 15,
            required_field_penalty: 40,
            required_field_ceiling: 29,
            ..Self::default()
        }
    }
}
