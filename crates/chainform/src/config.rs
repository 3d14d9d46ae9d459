use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chainform_spec::{FieldSet, MirrorValidator, NullMatching};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "chainform.toml";

/// Settings shared by every command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Master switch. Disabled means no field is ever hidden.
    pub enabled: bool,
    pub null_matching: NullMatching,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            enabled: true,
            null_matching: NullMatching::Lenient,
        }
    }
}

impl Config {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("invalid chainform configuration")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// An explicit path must exist; otherwise `chainform.toml` is read from
    /// the working directory when present and defaults apply when not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            debug!(path = %fallback.display(), "using config from working directory");
            return Self::from_file(&fallback);
        }
        Ok(Self::default())
    }

    pub fn with_strict_null(mut self, strict: bool) -> Self {
        if strict {
            self.null_matching = NullMatching::Strict;
        }
        self
    }

    pub fn mirror<'a>(&self, fields: &'a FieldSet) -> MirrorValidator<'a> {
        MirrorValidator::new(fields)
            .with_enabled(self.enabled)
            .with_null_matching(self.null_matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn parses_all_keys() {
        let config =
            Config::from_toml_str("enabled = false\nnull_matching = \"strict\"\n").unwrap();
        assert!(!config.enabled);
        assert_eq!(config.null_matching, NullMatching::Strict);
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(Config::from_toml_str("enable = true").is_err());
    }

    #[test]
    fn strict_flag_only_tightens() {
        let config = Config::default().with_strict_null(false);
        assert_eq!(config.null_matching, NullMatching::Lenient);
        let config = config.with_strict_null(true);
        assert_eq!(config.null_matching, NullMatching::Strict);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(dir.path().join("absent.toml").as_path())).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
