//! Scan configuration.
//!
//! A `ScanConfig` is immutable once handed to the orchestrator. It can be
//! loaded from YAML; every field is optional and falls back to its default.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};
use crate::lang::Language;

/// Ceilings bounding the work done per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum lines the resolver walks looking for a block's close.
    pub max_block_span: usize,
    /// Hard ceiling on characters the resolver examines per block.
    pub max_iterations: usize,
    /// Lines assumed for a block whose close was never found.
    pub fallback_span: usize,
    /// Lines searched for a block opener after the declaration line.
    pub opener_lookahead: usize,
    /// Maximum nesting depth of container recursion.
    pub max_depth: usize,
    /// Maximum declarations emitted per file.
    pub max_declarations: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_block_span: 2000,
            max_iterations: 1_000_000,
            fallback_span: 50,
            opener_lookahead: 8,
            max_depth: 20,
            max_declarations: 10_000,
        }
    }
}

/// Top-level scan configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Worker threads in the scan pool.
    pub workers: usize,
    /// Extension to language mappings that take precedence over the defaults.
    pub extension_overrides: BTreeMap<String, Language>,
    /// Whether import lists are extracted.
    pub extract_imports: bool,
    /// Whether a progress bar is drawn on stderr.
    pub show_progress: bool,
    /// Whether results are memoized by `(path, language)`.
    pub cache: bool,
    pub limits: Limits,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            extension_overrides: BTreeMap::new(),
            extract_imports: true,
            show_progress: false,
            cache: false,
            limits: Limits::default(),
        }
    }
}

impl ScanConfig {
    /// Parse a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&content)?;
        Ok(config)
    }

    /// Parse a configuration from YAML text and validate it.
    pub fn from_yaml(content: &str) -> anyhow::Result<Self> {
        let config: ScanConfig = if content.trim().is_empty() {
            ScanConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is usable.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ScanError::config("workers must be at least 1"));
        }
        let limits = &self.limits;
        for (name, value) in [
            ("max_block_span", limits.max_block_span),
            ("max_iterations", limits.max_iterations),
            ("max_depth", limits.max_depth),
            ("max_declarations", limits.max_declarations),
        ] {
            if value == 0 {
                return Err(ScanError::config(format!("limits.{} must be at least 1", name)));
            }
        }
        for ext in self.extension_overrides.keys() {
            let normalized = ext.trim_start_matches('.');
            if normalized.is_empty() || normalized.contains(|c| c == '/' || c == '\\') {
                return Err(ScanError::config(format!("invalid extension override '{}'", ext)));
            }
        }
        Ok(())
    }

    /// Resolve the language for an extension, honoring overrides.
    pub fn language_for_extension(&self, ext: &str) -> Option<Language> {
        let normalized = ext.trim_start_matches('.').to_lowercase();
        self.extension_overrides
            .iter()
            .find(|(k, _)| k.trim_start_matches('.').to_lowercase() == normalized)
            .map(|(_, lang)| *lang)
            .or_else(|| Language::from_extension(&normalized))
    }
}
