//! Flatten enums with a single placeholder value into typed leaves.
//!
//! Some generators emit `enum: [date]` where they mean "a date string". A
//! rule matching the placeholder replaces the enum with a type, a format
//! and an example.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{decode_options, describe_options};
use crate::error::{ConfigError, TransformError};
use crate::model::{Document, Schema};
use crate::registry::Transform;
use crate::schema_walker::walk_schemas;

const NAME: &str = "enums";

const SUMMARY: &str = "
The enums transform replaces an enum holding exactly one string equal to a
rule's `match` with the rule's type, format and example. The first matching
rule wins.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumOptions {
    #[serde(default)]
    pub flatten_single_enum: Vec<SingleEnumRewrite>,
}

/// Replacement for a single-value enum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SingleEnumRewrite {
    #[serde(rename = "match")]
    pub match_value: String,
    #[serde(rename = "type")]
    pub schema_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
}

impl SingleEnumRewrite {
    fn matches(&self, schema: &Schema) -> bool {
        match schema.enum_values.as_slice() {
            [Value::String(value)] => *value == self.match_value,
            _ => false,
        }
    }

    fn apply(&self, schema: &mut Schema) {
        schema.enum_values.clear();
        schema.schema_type = Some(self.schema_type.clone());
        schema.format = self.format.clone();
        schema.example = self.example.clone();
    }
}

/// The `enums` transform.
#[derive(Debug, Clone, Default)]
pub struct EnumsTransform {
    options: EnumOptions,
}

impl EnumsTransform {
    pub fn new(options: EnumOptions) -> Self {
        Self { options }
    }
}

impl Transform for EnumsTransform {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> String {
        describe_options(SUMMARY, &self.options)
    }

    fn configure(&self, payload: &Value) -> Result<Box<dyn Transform>, ConfigError> {
        let options = decode_options(NAME, payload)?;
        Ok(Box::new(Self::new(options)))
    }

    fn transform_v3(&self, doc: &mut Document) -> Result<(), TransformError> {
        let rules = &self.options.flatten_single_enum;
        if rules.is_empty() {
            return Ok(());
        }
        walk_schemas(doc, |parent, schema| {
            let schema = &mut schema.value;
            if let Some(rule) = rules.iter().find(|rule| rule.matches(schema)) {
                rule.apply(schema);
                debug!(parent = %parent, value = %rule.match_value, "flattened single value enum");
            }
        });
        Ok(())
    }
}
