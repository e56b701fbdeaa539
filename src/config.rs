//! Configuration file loading.
//!
//! `doxidx.toml` tunes generation and search. Every field has a default, so
//! the file is optional; an explicitly passed path that cannot be read is an
//! error, while a missing implicit one silently falls back to defaults.

use crate::record::Shard;
use crate::sections::Section;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// File name probed next to the working directory.
pub const FILE_NAME: &str = "doxidx.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub generate: GenerateConfig,
    pub search: SearchConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// Variable name assigned in generated shard files.
    pub variable: String,
    /// Sections to emit; every section when unset. `all` is always kept
    /// because the UI's default search scope reads from it.
    pub sections: Option<Vec<Section>>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            variable: Shard::VARIABLE.to_string(),
            sections: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Maximum number of results returned per query.
    pub limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { limit: 25 }
    }
}

impl Config {
    /// Loads configuration.
    ///
    /// `explicit` must exist and parse when given; otherwise `doxidx.toml`
    /// under `base` is used when present, defaults when not.
    pub fn load(explicit: Option<&Path>, base: &Path) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = base.join(FILE_NAME);
                if !candidate.is_file() {
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&text)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
