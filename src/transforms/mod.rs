//! Built-in transforms.
//!
//! - `allOf`: drops, merges or promotes `allOf` members without type
//!   information.
//! - `discriminator`: adds a schema's discriminator as a property and as
//!   required.
//! - `enums`: turns single value enums into typed leaves.
//! - `replacements`: replaces whole nodes at exact paths.
//! - `rewrites`: rewrites string fields with regular expressions.

mod all_of;
mod discriminator;
mod enums;
mod replacement;
mod rewrite;

pub use all_of::{AllOfRule, AllOfTransform};
pub use discriminator::{DiscriminatorRule, DiscriminatorTransform};
pub use enums::{EnumOptions, EnumsTransform, SingleEnumRewrite};
pub use replacement::{ReplacementRule, ReplacementTransform};
pub use rewrite::{RewriteOptions, RewritePattern, RewriteRule, RewriteTransform};

use std::fmt::Write;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConfigError, TransformError};

/// Decode a configuration payload into a transform's options.
pub(crate) fn decode_options<T: DeserializeOwned>(
    transform: &str,
    payload: &Value,
) -> Result<T, ConfigError> {
    T::deserialize(payload).map_err(|e| decode_error(transform, e))
}

pub(crate) fn decode_error(transform: &str, message: impl ToString) -> ConfigError {
    ConfigError::Decode {
        transform: transform.to_string(),
        message: message.to_string(),
    }
}

/// A description paragraph followed by the options rendered as YAML.
pub(crate) fn describe_options<T: Serialize>(summary: &str, options: &T) -> String {
    let mut out = String::from(summary.trim());
    out.push_str("\n\noptions:\n");
    match serde_yaml::to_string(options) {
        Ok(yaml) => {
            for line in yaml.lines() {
                let _ = writeln!(out, "  {}", line);
            }
        }
        Err(e) => {
            let _ = writeln!(out, "  <unavailable: {}>", e);
        }
    }
    out
}

pub(crate) fn rule_error(
    transform: &str,
    rule: usize,
    path: impl ToString,
    message: impl ToString,
) -> TransformError {
    TransformError::RuleApplication {
        transform: transform.to_string(),
        rule,
        path: path.to_string(),
        message: message.to_string(),
    }
}
