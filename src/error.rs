//! Typed failure kinds
//!
//! Each stage of a patch run reports its own error type. The CLI layer wraps
//! them with `anyhow` context naming the step that failed.

use std::path::PathBuf;
use thiserror::Error;

/// Failures while turning `key=value` tokens into a patch set
#[derive(Debug, Error)]
pub enum ArgumentError {
    #[error("invalid key/value pair {token:?}: format must be key=value")]
    Malformed { token: String },

    #[error("invalid key/value pair {token:?}: error reading file {path:?}")]
    FileRead {
        token: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key/value pair {token:?}: error reading from stdin")]
    StdinRead {
        token: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key/value pair {token:?}: stdin is not supported")]
    StdinUnavailable { token: String },

    #[error("invalid key/value pair {token:?}: stdin already consumed")]
    StdinConsumed { token: String },

    #[error("invalid key/value pair {token:?}: expected a JSON object")]
    InvalidJson {
        token: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures talking to the secret store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("permission denied on {path:?} ({})", .errors.join(", "))]
    PermissionDenied { path: String, errors: Vec<String> },

    #[error("store returned status {status} for {path:?}: {}", errors_or_placeholder(.errors))]
    Api {
        path: String,
        status: u16,
        errors: Vec<String>,
    },

    #[error("unable to decode response for {path:?}")]
    Decode {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Failures resolving startup configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to parse log level: not a valid level: {0:?}")]
    InvalidLogLevel(String),

    #[error("Failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

fn errors_or_placeholder(errors: &[String]) -> String {
    if errors.is_empty() {
        "no error details".to_string()
    } else {
        errors.join(", ")
    }
}
