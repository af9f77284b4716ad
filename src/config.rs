//! Transform configuration.
//!
//! A configuration is a YAML document with an ordered `configs` list. Each
//! entry is a single-key mapping from a transform name to that transform's
//! payload:
//!
//! ```yaml
//! configs:
//!   - discriminator:
//!       - pathPrefix: [components, schemas]
//!         createProperty: true
//!   - enums:
//!       flatten_single_enum:
//!         - match: date
//!           type: string
//!           format: date
//! ```

use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ConfigError;

/// One named transform and its raw payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    pub name: String,
    pub payload: Value,
}

/// The ordered list of transforms to apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformConfig {
    pub entries: Vec<ConfigEntry>,
}

#[derive(Deserialize)]
struct RawConfig {
    #[serde(default)]
    configs: Vec<Map<String, Value>>,
}

impl TransformConfig {
    /// Parse a configuration from YAML text, keeping entry order.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|source| ConfigError::InvalidYaml { source })?;

        let entries = raw
            .configs
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                if entry.len() != 1 {
                    return Err(ConfigError::MalformedEntry {
                        index,
                        keys: entry.keys().cloned().collect(),
                    });
                }
                let (name, payload) = entry.into_iter().next().ok_or(ConfigError::MalformedEntry {
                    index,
                    keys: Vec::new(),
                })?;
                Ok(ConfigEntry { name, payload })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// Load a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Transform names in configuration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
