//! Replace whole nodes at exact paths.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{decode_error, decode_options, describe_options, rule_error};
use crate::error::{ConfigError, TransformError};
use crate::model::Document;
use crate::registry::Transform;
use crate::walker::Walker;

const NAME: &str = "replacements";

const SUMMARY: &str = "
The replacements transform replaces the node found at exactly `path` with
`replacement`, decoded as the node's type. Fields of the old node that the
replacement does not set are cleared. When several rules name the same
path the last one wins.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplacementRule {
    pub path: Vec<String>,
    pub replacement: Value,
}

/// The `replacements` transform.
#[derive(Debug, Clone, Default)]
pub struct ReplacementTransform {
    rules: Vec<ReplacementRule>,
}

impl ReplacementTransform {
    pub fn new(rules: Vec<ReplacementRule>) -> Self {
        Self { rules }
    }
}

impl Transform for ReplacementTransform {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> String {
        describe_options(SUMMARY, &self.rules)
    }

    fn configure(&self, payload: &Value) -> Result<Box<dyn Transform>, ConfigError> {
        let rules: Vec<ReplacementRule> = decode_options(NAME, payload)?;
        if let Some(index) = rules.iter().position(|rule| !rule.replacement.is_object()) {
            return Err(decode_error(
                NAME,
                format!("rule {}: replacement must be a mapping", index),
            ));
        }
        Ok(Box::new(Self::new(rules)))
    }

    fn transform_v3(&self, doc: &mut Document) -> Result<(), TransformError> {
        if self.rules.is_empty() {
            return Ok(());
        }
        let walker = self
            .rules
            .iter()
            .fold(Walker::new(), |walker, rule| walker.visit_prefix(rule.path.iter().cloned()));

        walker.walk(doc, |path, _, node| {
            let Some((index, rule)) = self
                .rules
                .iter()
                .enumerate()
                .rev()
                .find(|(_, rule)| path.matches(&rule.path))
            else {
                return Ok(true);
            };
            let kind = node.kind();
            node.replace_with(rule.replacement.clone()).map_err(|e| {
                rule_error(NAME, index, path, format!("not a valid {}: {}", kind.name(), e))
            })?;
            debug!(path = %path, rule = index, node = kind.name(), "replaced node");
            Ok(true)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOC: &str = r##"
openapi: 3.0.3
info:
  title: Shop
  version: "1"
  description: internal
paths: {}
components:
  schemas:
    Money:
      type: object
      description: amount and currency
      properties:
        amount: {type: integer}
        currency: {type: string}
    Order:
      type: object
      properties:
        total: {$ref: "#/components/schemas/Money"}
"##;

    fn doc() -> Document {
        serde_yaml::from_str(DOC).unwrap()
    }

    fn transform(payload: Value) -> Box<dyn Transform> {
        ReplacementTransform::default().configure(&payload).unwrap()
    }

    #[test]
    fn replaces_schema_and_clears_old_fields() {
        let mut doc = doc();
        transform(json!([{
            "path": ["components", "schemas", "Money"],
            "replacement": { "type": "string", "pattern": "^[0-9]+ [A-Z]{3}$" }
        }]))
        .transform_v3(&mut doc)
        .unwrap();

        let money = &doc.components.schemas["Money"].value;
        assert_eq!(money.schema_type.as_deref(), Some("string"));
        assert_eq!(money.pattern.as_deref(), Some("^[0-9]+ [A-Z]{3}$"));
        assert_eq!(money.description, None);
        assert!(money.properties.is_empty());
    }

    #[test]
    fn replaces_non_schema_nodes() {
        let mut doc = doc();
        transform(json!([{
            "path": ["info"],
            "replacement": { "title": "Public shop", "version": "2" }
        }]))
        .transform_v3(&mut doc)
        .unwrap();

        assert_eq!(doc.info.title, "Public shop");
        assert_eq!(doc.info.version, "2");
        assert_eq!(doc.info.description, None);
    }

    #[test]
    fn can_replace_a_reference() {
        let mut doc = doc();
        transform(json!([{
            "path": ["components", "schemas", "Order", "properties", "total"],
            "replacement": { "type": "number" }
        }]))
        .transform_v3(&mut doc)
        .unwrap();

        let total = &doc.components.schemas["Order"].value.properties["total"];
        assert!(!total.is_reference());
        assert_eq!(total.value.schema_type.as_deref(), Some("number"));
    }

    #[test]
    fn last_rule_for_a_path_wins() {
        let mut doc = doc();
        transform(json!([
            { "path": ["components", "schemas", "Money"], "replacement": { "type": "string" } },
            { "path": ["components", "schemas", "Money"], "replacement": { "type": "number" } },
        ]))
        .transform_v3(&mut doc)
        .unwrap();

        assert_eq!(
            doc.components.schemas["Money"].value.schema_type.as_deref(),
            Some("number")
        );
    }

    #[test]
    fn undecodable_replacement_fails_at_path() {
        let mut doc = doc();
        let err = transform(json!([{
            "path": ["components", "schemas", "Money"],
            "replacement": { "required": "amount" }
        }]))
        .transform_v3(&mut doc)
        .unwrap_err();

        match err {
            TransformError::RuleApplication { rule, path, .. } => {
                assert_eq!(rule, 0);
                assert_eq!(path, "components:schemas:Money");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert_eq!(
            doc.components.schemas["Money"].value.description.as_deref(),
            Some("amount and currency")
        );
    }

    #[test]
    fn replacement_must_be_a_mapping() {
        let err = ReplacementTransform::default()
            .configure(&json!([{ "path": ["info"], "replacement": "x" }]))
            .err()
            .unwrap();
        assert!(err.to_string().contains("must be a mapping"));
    }
}
