use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Result text that marks a tool invocation as cancelled by the user.
pub const DEFAULT_ABORT_SENTINEL: &str = "User aborted";

/// Scanner settings.
///
/// Loaded from TOML; every key is optional:
///
/// ```toml
/// abort_sentinel = "User aborted"
/// ```
#[derive(Debug, Clone, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    pub abort_sentinel: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            abort_sentinel: DEFAULT_ABORT_SENTINEL.to_string(),
        }
    }
}

impl ScanConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig =
            toml::from_str(raw).map_err(|source| ConfigError::Parse { source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn with_abort_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.abort_sentinel = sentinel.into();
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.abort_sentinel.is_empty() {
            return Err(ConfigError::EmptyAbortSentinel);
        }
        Ok(())
    }
}
