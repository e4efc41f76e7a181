//! Editor tunables.
//!
//! Loaded from a TOML file; every field has a default so an empty file
//! (or no file at all) is a valid configuration.
//!
//! ```toml
//! history_cap = 50
//! autosave_delay_ms = 30000
//! allowed_embeds = ["iframe"]
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default number of undo snapshots kept per session.
pub const DEFAULT_HISTORY_CAP: usize = 50;

/// Default autosave quiet period.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 30_000;

/// Embedding tags the sanitizer may be told to keep.
pub const EMBED_TAGS: &[&str] = &["iframe", "object", "embed"];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum undo snapshots; the oldest is evicted past this.
    pub history_cap: usize,
    /// Quiet period after the last edit before an autosave fires.
    pub autosave_delay_ms: u64,
    /// Embedding tags (`iframe`, `object`, `embed`) kept by the sanitizer.
    pub allowed_embeds: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_cap: DEFAULT_HISTORY_CAP,
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            allowed_embeds: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.history_cap == 0 {
            return Err(ConfigError::Invalid("history_cap must be at least 1".into()));
        }
        if let Some(tag) = self
            .allowed_embeds
            .iter()
            .find(|tag| !EMBED_TAGS.contains(&tag.to_ascii_lowercase().as_str()))
        {
            return Err(ConfigError::Invalid(format!(
                "allowed_embeds: `{tag}` is not one of iframe, object, embed"
            )));
        }
        Ok(())
    }
}
