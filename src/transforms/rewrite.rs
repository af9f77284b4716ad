//! Regular expression rewrites of string schema fields.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{decode_error, decode_options, describe_options, rule_error};
use crate::error::{ConfigError, TransformError};
use crate::model::{Document, Schema, SchemaField};
use crate::registry::Transform;
use crate::schema::FieldText;
use crate::schema_walker::{walk_schemas, SchemaParent};

const NAME: &str = "rewrites";

const SUMMARY: &str = "
The rewrites transform applies a `/regex/replacement/` rewrite to the string
field named by `replace`. A rule only applies to schemas whose `match` fields
all hold the given strings and, when `properties` is set, to properties with
one of the listed names. Every match is replaced; the replacement may use
capture group references such as $1.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteOptions {
    #[serde(default)]
    pub rewrites: Vec<RewriteRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteRule {
    /// The field to rewrite.
    pub replace: SchemaField,
    pub rewrite: RewritePattern,
    /// Fields that must hold exactly these strings.
    #[serde(rename = "match", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub match_fields: BTreeMap<SchemaField, String>,
    /// Property names the rule is restricted to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<String>,
}

/// Outcome of checking one rule against one schema.
enum Check<'s> {
    Skip,
    Rewrite(&'s str),
    NotText,
}

impl RewriteRule {
    fn check<'s>(&self, parent: &SchemaParent<'_>, schema: &'s Schema) -> Check<'s> {
        let current = schema.field_text(&self.replace);
        if current == FieldText::Absent {
            return Check::Skip;
        }
        let fields_match = self.match_fields.iter().all(|(field, expected)| {
            matches!(schema.field_text(field), FieldText::Text(actual) if actual == expected)
        });
        if !fields_match {
            return Check::Skip;
        }
        if !self.properties.is_empty()
            && !parent
                .property_name()
                .is_some_and(|name| self.properties.iter().any(|p| p == name))
        {
            return Check::Skip;
        }
        match current {
            FieldText::Text(text) => Check::Rewrite(text),
            _ => Check::NotText,
        }
    }
}

/// A `/regex/replacement/` literal.
#[derive(Debug, Clone)]
pub struct RewritePattern {
    regex: Regex,
    replacement: String,
    literal: String,
}

impl RewritePattern {
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    /// Rewrite every match in `text`. Returns `None` if nothing changes.
    pub fn apply(&self, text: &str) -> Option<String> {
        if !self.regex.is_match(text) {
            return None;
        }
        let rewritten = self.regex.replace_all(text, self.replacement.as_str());
        (rewritten != text).then(|| rewritten.into_owned())
    }
}

impl FromStr for RewritePattern {
    type Err = String;

    fn from_str(literal: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = literal.split('/').filter(|part| !part.is_empty()).collect();
        let [pattern, replacement] = parts.as_slice() else {
            return Err(format!(
                "rewrite {:?} must have the form /regex/replacement/ (found {} parts)",
                literal,
                parts.len()
            ));
        };
        let regex = Regex::new(pattern)
            .map_err(|e| format!("rewrite {:?} has an invalid regex: {}", literal, e))?;
        Ok(Self {
            regex,
            replacement: replacement.to_string(),
            literal: literal.to_string(),
        })
    }
}

impl PartialEq for RewritePattern {
    fn eq(&self, other: &Self) -> bool {
        self.literal == other.literal
    }
}

impl fmt::Display for RewritePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.literal)
    }
}

impl Serialize for RewritePattern {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.literal)
    }
}

impl<'de> Deserialize<'de> for RewritePattern {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        literal.parse().map_err(serde::de::Error::custom)
    }
}

/// The `rewrites` transform.
#[derive(Debug, Clone, Default)]
pub struct RewriteTransform {
    options: RewriteOptions,
}

impl RewriteTransform {
    pub fn new(options: RewriteOptions) -> Self {
        Self { options }
    }
}

impl Transform for RewriteTransform {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> String {
        describe_options(SUMMARY, &self.options)
    }

    fn configure(&self, payload: &Value) -> Result<Box<dyn Transform>, ConfigError> {
        let options: RewriteOptions = decode_options(NAME, payload)?;
        for (index, rule) in options.rewrites.iter().enumerate() {
            let not_text = std::iter::once(&rule.replace)
                .chain(rule.match_fields.keys())
                .find(|field| !field.holds_text());
            if let Some(field) = not_text {
                return Err(decode_error(
                    NAME,
                    format!("rule {}: {} does not hold text", index, field),
                ));
            }
        }
        Ok(Box::new(Self::new(options)))
    }

    fn transform_v3(&self, doc: &mut Document) -> Result<(), TransformError> {
        let rules = &self.options.rewrites;
        if rules.is_empty() {
            return Ok(());
        }

        let mut failure: Option<TransformError> = None;
        walk_schemas(doc, |parent, schema| {
            if failure.is_some() {
                return;
            }
            let schema = &mut schema.value;
            for (index, rule) in rules.iter().enumerate() {
                let rewritten = match rule.check(parent, schema) {
                    Check::Skip => continue,
                    Check::Rewrite(text) => rule.rewrite.apply(text),
                    Check::NotText => {
                        failure = Some(rule_error(
                            NAME,
                            index,
                            parent,
                            format!("{} is not a string", rule.replace),
                        ));
                        return;
                    }
                };
                if let Some(rewritten) = rewritten {
                    debug!(
                        parent = %parent,
                        field = %rule.replace,
                        value = %rewritten,
                        "rewrote field"
                    );
                    schema.set_field_text(&rule.replace, rewritten);
                }
            }
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOC: &str = r##"
openapi: 3.0.3
info: {title: Rewrites, version: "1"}
paths: {}
components:
  schemas:
    Range:
      type: object
      properties:
        label:
          type: string
          example: example_replacement
        note:
          type: string
          example: unrelated
        start:
          type: integer_error
        end:
          type: integer_error
        version:
          type: string
          description: v12 or v13
        count:
          type: integer
          example: example_replacement
"##;

    fn doc() -> Document {
        serde_yaml::from_str(DOC).unwrap()
    }

    fn property<'a>(doc: &'a Document, name: &str) -> &'a Schema {
        &doc.components.schemas["Range"].value.properties[name].value
    }

    fn transform(payload: Value) -> Box<dyn Transform> {
        RewriteTransform::default().configure(&payload).unwrap()
    }

    #[test]
    fn rewrites_matching_example() {
        let mut doc = doc();
        transform(json!({ "rewrites": [{
            "replace": "example",
            "rewrite": "/^example_replacement$/something-new/",
            "match": { "type": "string" }
        }]}))
        .transform_v3(&mut doc)
        .unwrap();

        assert_eq!(property(&doc, "label").example, Some(json!("something-new")));
        assert_eq!(property(&doc, "note").example, Some(json!("unrelated")));
        // `type: integer` does not match.
        assert_eq!(property(&doc, "count").example, Some(json!("example_replacement")));
    }

    #[test]
    fn restricted_to_named_properties() {
        let mut doc = doc();
        transform(json!({ "rewrites": [{
            "replace": "type",
            "rewrite": "/^integer_error$/integer/",
            "properties": ["end"]
        }]}))
        .transform_v3(&mut doc)
        .unwrap();

        assert_eq!(property(&doc, "end").schema_type.as_deref(), Some("integer"));
        assert_eq!(property(&doc, "start").schema_type.as_deref(), Some("integer_error"));
    }

    #[test]
    fn replaces_every_match_with_captures() {
        let mut doc = doc();
        transform(json!({ "rewrites": [{
            "replace": "description",
            "rewrite": "/v(\\d+)/version $1/"
        }]}))
        .transform_v3(&mut doc)
        .unwrap();

        assert_eq!(
            property(&doc, "version").description.as_deref(),
            Some("version 12 or version 13")
        );
    }

    #[test]
    fn non_string_target_fails() {
        let mut doc: Document = serde_yaml::from_str(
            r##"
openapi: 3.0.3
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Count:
      type: integer
      example: 5
"##,
        )
        .unwrap();
        let err = transform(json!({ "rewrites": [
            { "replace": "type", "rewrite": "/^integer$/number/" },
            { "replace": "example", "rewrite": "/5/6/" },
        ]}))
        .transform_v3(&mut doc)
        .unwrap_err();

        match err {
            TransformError::RuleApplication {
                rule, path, message, ..
            } => {
                assert_eq!(rule, 1);
                assert_eq!(path, "components:schemas:Count");
                assert_eq!(message, "example is not a string");
            }
            other => panic!("unexpected error: {}", other),
        }
        // The first rule's edit is kept.
        assert_eq!(
            doc.components.schemas["Count"].value.schema_type.as_deref(),
            Some("number")
        );
    }

    #[test]
    fn pattern_literal_forms() {
        let pattern: RewritePattern = "/^a(b)$/x$1/".parse().unwrap();
        assert_eq!(pattern.replacement(), "x$1");
        assert_eq!(pattern.apply("ab").as_deref(), Some("xb"));
        assert_eq!(pattern.apply("cab"), None);
        assert_eq!(pattern.to_string(), "/^a(b)$/x$1/");

        // Missing leading or trailing delimiters are tolerated.
        assert!("^a$/b".parse::<RewritePattern>().is_ok());

        assert!("/only-one/".parse::<RewritePattern>().is_err());
        assert!("/a/b/c/".parse::<RewritePattern>().is_err());
        assert!("/(/b/".parse::<RewritePattern>().unwrap_err().contains("invalid regex"));
    }

    #[test]
    fn bad_pattern_is_a_config_error() {
        let err = RewriteTransform::default()
            .configure(&json!({ "rewrites": [{ "replace": "example", "rewrite": "/x/" }] }))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::Decode { .. }));
        assert!(err.to_string().contains("/regex/replacement/"));
    }

    #[test]
    fn structural_fields_are_a_config_error() {
        for rule in [
            json!({ "replace": "required", "rewrite": "/a/b/" }),
            json!({ "replace": "example", "rewrite": "/a/b/", "match": { "readOnly": "true" } }),
        ] {
            let payload = json!({ "rewrites": [{ "replace": "title", "rewrite": "/a/b/" }, rule] });
            let err = RewriteTransform::default().configure(&payload).err().unwrap();
            assert!(matches!(err, ConfigError::Decode { .. }));
            assert!(err.to_string().contains("rule 1:"), "{}", err);
            assert!(err.to_string().contains("does not hold text"), "{}", err);
        }
    }

    #[test]
    fn unknown_field_is_a_config_error() {
        let err = RewriteTransform::default()
            .configure(&json!({ "rewrites": [{ "replace": "colour", "rewrite": "/a/b/" }] }))
            .err()
            .unwrap();
        assert!(err.to_string().contains("unknown schema field"));
    }
}
