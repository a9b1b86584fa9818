use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading a [`crate::ScanConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config TOML: {source}")]
    Parse {
        #[source]
        source: toml::de::Error,
    },
    #[error("abort sentinel must not be empty")]
    EmptyAbortSentinel,
}

/// Failures for a single transcript line. A bad line never ends a replay.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("I/O error while reading transcript line {line_number}: {source}")]
    Io {
        line_number: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("transcript line {line_number} is not valid UTF-8")]
    InvalidUtf8 { line_number: usize },
    #[error("transcript line {line_number} is not valid JSON: {source}")]
    Json {
        line_number: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("transcript line {line_number} is not a history update: {source}")]
    Decode {
        line_number: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl ReplayError {
    pub fn line_number(&self) -> usize {
        match self {
            ReplayError::Io { line_number, .. }
            | ReplayError::InvalidUtf8 { line_number }
            | ReplayError::Json { line_number, .. }
            | ReplayError::Decode { line_number, .. } => *line_number,
        }
    }
}
