use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::catalog::{CatalogEntry, IntentCatalog};
use crate::error::{AssistantError, Result};
use crate::normalize::normalize;

pub const DEFAULT_THRESHOLD: u8 = 60;
pub const DEFAULT_RESPONSE: &str = "I'm not sure I understood that. Could you please rephrase?";

/// Tunable assistant settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    /// A fallback score must be strictly greater than this to be accepted (0-100)
    pub threshold: u8,

    /// Returned when neither a rule nor the fallback is confident
    pub default_response: String,

    /// Fallback catalog in priority order
    pub catalog: IntentCatalog,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            default_response: DEFAULT_RESPONSE.to_string(),
            catalog: IntentCatalog::builtin(),
        }
    }
}

impl AssistantConfig {
    /// Parse a TOML document, normalize catalog keywords, and validate.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let parsed: Self = toml::from_str(raw)?;
        parsed.normalized().validated()
    }

    /// Read and parse a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        log::debug!("loaded assistant config from {}", path.display());
        Self::from_toml_str(&raw)
    }

    /// Keywords are compared against normalized input, so they get the same treatment.
    #[must_use]
    pub fn normalized(self) -> Self {
        let entries = self
            .catalog
            .entries()
            .iter()
            .map(|entry| CatalogEntry::new(normalize(&entry.keyword), entry.response.clone()))
            .collect();
        Self {
            catalog: IntentCatalog::new(entries),
            ..self
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.threshold > 100 {
            return Err(AssistantError::invalid_config(format!(
                "threshold ({}) must be within 0..=100",
                self.threshold
            )));
        }

        if self.catalog.is_empty() {
            return Err(AssistantError::invalid_config(
                "catalog must contain at least one entry",
            ));
        }

        let mut seen = HashSet::new();
        for (idx, entry) in self.catalog.entries().iter().enumerate() {
            if entry.keyword.trim().is_empty() {
                return Err(AssistantError::invalid_config(format!(
                    "catalog[{idx}].keyword must be non-empty"
                )));
            }
            if entry.keyword != normalize(&entry.keyword) {
                return Err(AssistantError::invalid_config(format!(
                    "catalog[{idx}].keyword {:?} must be lowercase without surrounding whitespace",
                    entry.keyword
                )));
            }
            if !seen.insert(entry.keyword.as_str()) {
                return Err(AssistantError::invalid_config(format!(
                    "catalog[{idx}].keyword {:?} is duplicated",
                    entry.keyword
                )));
            }
        }

        Ok(())
    }

    fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}
