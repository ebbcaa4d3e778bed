//! Tokenizer configuration
//!
//! Configured once per authoring session. Loaded from YAML or JSON; every
//! field has a default so partial documents are accepted.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::TokenizerError;
use crate::models::beat::Beat;
use crate::models::serde_helpers::fraction;
use crate::tokenizer::resolver::{SubdivisionPolicy, MODEL_MAX_SUBDIVISION};

/// Cycle length used when none is configured
pub const DEFAULT_N_BEATS: u32 = 4;

/// Largest subdivision the authoring UI offers
pub const DEFAULT_MAX_SUBDIVISION: u32 = 16;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Cycle length in beats
    #[serde(alias = "nBeats", alias = "modelCycleLength")]
    pub n_beats: u32,

    /// Quantization granularity, in beats (1, 1/2, 1/4, ...)
    #[serde(with = "fraction")]
    pub snap: Beat,

    /// Subdivision ceiling for the grid policy
    #[serde(alias = "maxSubdivision")]
    pub max_subdivision: u32,

    pub policy: SubdivisionPolicy,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            n_beats: DEFAULT_N_BEATS,
            snap: Beat::new(1, 4),
            max_subdivision: DEFAULT_MAX_SUBDIVISION,
            policy: SubdivisionPolicy::default(),
        }
    }
}

impl TokenizerConfig {
    pub fn new(n_beats: u32, snap: Beat) -> Self {
        Self {
            n_beats,
            snap,
            ..Self::default()
        }
    }

    pub fn with_policy(mut self, policy: SubdivisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_subdivision(mut self, max_subdivision: u32) -> Self {
        self.max_subdivision = max_subdivision;
        self
    }

    /// Check the invariants every other component relies on
    pub fn validate(&self) -> Result<(), TokenizerError> {
        if self.n_beats == 0 {
            return Err(TokenizerError::InvalidConfig(
                "n_beats must be a positive integer".to_string(),
            ));
        }
        if self.snap <= Beat::from_integer(0) {
            return Err(TokenizerError::InvalidConfig(format!(
                "snap must be positive, got {}",
                self.snap
            )));
        }
        if self.snap > Beat::from_integer(1) {
            return Err(TokenizerError::InvalidConfig(format!(
                "snap must be at most one beat, got {}",
                self.snap
            )));
        }
        if self.max_subdivision == 0 || self.max_subdivision > MODEL_MAX_SUBDIVISION {
            return Err(TokenizerError::InvalidConfig(format!(
                "max_subdivision must be between 1 and {}, got {}",
                MODEL_MAX_SUBDIVISION, self.max_subdivision
            )));
        }
        Ok(())
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(text: &str) -> Result<Self, TokenizerError> {
        let config: Self = serde_yaml::from_str(text)
            .map_err(|e| TokenizerError::InvalidConfig(format!("YAML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(text: &str) -> Result<Self, TokenizerError> {
        let config: Self = serde_json::from_str(text)
            .map_err(|e| TokenizerError::InvalidConfig(format!("JSON parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` files are read as JSON, anything else as YAML
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TokenizerError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            TokenizerError::InvalidConfig(format!("Cannot read {}: {}", path.display(), e))
        })?;

        log::debug!("Loading tokenizer config from {}", path.display());

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }
}
