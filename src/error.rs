//! Error types for document loading, transform configuration and
//! transform application.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::DocumentVariant;

/// Errors while loading or serializing a document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    // Parse errors (exit code 2)
    #[error("invalid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("unsupported document version \"{version}\": expected swagger 2.0 or openapi 3.0")]
    UnsupportedVersion { version: String },

    #[error("failed to serialize document: {message}")]
    Serialize { message: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors while reading a transform configuration or configuring a
/// transform from it.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("configs entry {index} must name exactly one transform, found {}", describe_keys(keys))]
    MalformedEntry { index: usize, keys: Vec<String> },

    #[error("unknown transform \"{name}\" (installed: {})", installed.join(", "))]
    UnknownTransform {
        name: String,
        installed: Vec<String>,
    },

    #[error("invalid configuration for {transform}: {message}")]
    Decode { transform: String, message: String },
}

fn describe_keys(keys: &[String]) -> String {
    if keys.is_empty() {
        "none".to_string()
    } else {
        keys.join(", ")
    }
}

impl ConfigError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            ConfigError::ReadError { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors while applying a configured transform to a document.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{transform}: rule {rule} failed at {path}: {message}")]
    RuleApplication {
        transform: String,
        rule: usize,
        path: String,
        message: String,
    },

    #[error("{transform}: not implemented for {variant} documents")]
    NotImplementedForVariant {
        transform: String,
        variant: DocumentVariant,
    },
}

impl TransformError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        1
    }
}
