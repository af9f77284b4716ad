//! Make a schema's discriminator an explicit, required string property.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{decode_options, describe_options};
use crate::error::{ConfigError, TransformError};
use crate::model::{is_false, Document, Schema, SchemaRef};
use crate::registry::Transform;
use crate::walker::{Node, Walker};

const NAME: &str = "discriminator";

const SUMMARY: &str = "
The discriminator transform makes the property named by a schema's
discriminator explicit. With createProperty a string property is added when
the schema does not declare it; with createRequired the property is added to
the schema's required list. Rules apply to schemas below `pathPrefix`, or to
every schema when it is empty.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DiscriminatorRule {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path_prefix: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub create_property: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub create_required: bool,
}

impl DiscriminatorRule {
    /// Returns true if the schema was changed.
    fn apply(&self, schema: &mut Schema) -> bool {
        let Some(property) = schema
            .discriminator
            .as_ref()
            .map(|discriminator| discriminator.property_name.clone())
            .filter(|name| !name.is_empty())
        else {
            return false;
        };

        let mut changed = false;
        if self.create_property && !schema.properties.contains_key(&property) {
            schema
                .properties
                .insert(property.clone(), SchemaRef::new(Schema::typed("string")));
            changed = true;
        }
        if self.create_required && !schema.required.contains(&property) {
            schema.required.push(property);
            changed = true;
        }
        changed
    }
}

/// The `discriminator` transform.
#[derive(Debug, Clone, Default)]
pub struct DiscriminatorTransform {
    rules: Vec<DiscriminatorRule>,
}

impl DiscriminatorTransform {
    pub fn new(rules: Vec<DiscriminatorRule>) -> Self {
        Self { rules }
    }
}

impl Transform for DiscriminatorTransform {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> String {
        describe_options(SUMMARY, &self.rules)
    }

    fn configure(&self, payload: &Value) -> Result<Box<dyn Transform>, ConfigError> {
        let rules = decode_options(NAME, payload)?;
        Ok(Box::new(Self::new(rules)))
    }

    fn transform_v3(&self, doc: &mut Document) -> Result<(), TransformError> {
        if self.rules.is_empty() {
            return Ok(());
        }
        let walker = self.rules.iter().fold(Walker::new(), |walker, rule| {
            walker.visit_prefix(rule.path_prefix.iter().cloned())
        });

        walker.walk(doc, |path, _, node| {
            let Node::Schema(schema) = node else {
                return Ok(true);
            };
            if schema.is_reference() {
                return Ok(true);
            }
            for (index, rule) in self.rules.iter().enumerate() {
                if path.starts_with(&rule.path_prefix) && rule.apply(&mut schema.value) {
                    debug!(path = %path, rule = index, "added discriminator property");
                }
            }
            Ok::<_, TransformError>(true)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DOC: &str = r##"
openapi: 3.0.3
info: {title: Pets, version: "1"}
paths:
  /pets:
    get:
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                type: object
                discriminator: {propertyName: kind}
components:
  schemas:
    Pet:
      type: object
      discriminator:
        propertyName: pet_type
      properties:
        name: {type: string}
    Cat:
      type: object
      discriminator:
        propertyName: pet_type
      required: [pet_type]
      properties:
        pet_type: {type: string, enum: [cat]}
    Plain:
      type: object
"##;

    fn doc() -> Document {
        serde_yaml::from_str(DOC).unwrap()
    }

    fn transform(payload: Value) -> Box<dyn Transform> {
        DiscriminatorTransform::default().configure(&payload).unwrap()
    }

    #[test]
    fn adds_property_and_required() {
        let mut doc = doc();
        transform(json!([{
            "pathPrefix": ["components", "schemas"],
            "createProperty": true,
            "createRequired": true
        }]))
        .transform_v3(&mut doc)
        .unwrap();

        let pet = &doc.components.schemas["Pet"].value;
        assert_eq!(
            pet.properties["pet_type"].value.schema_type.as_deref(),
            Some("string")
        );
        assert_eq!(pet.required, ["pet_type"]);

        // Already declared: left alone, not duplicated.
        let cat = &doc.components.schemas["Cat"].value;
        assert_eq!(cat.properties["pet_type"].value.enum_values, [json!("cat")]);
        assert_eq!(cat.required, ["pet_type"]);

        assert!(doc.components.schemas["Plain"].value.properties.is_empty());
    }

    #[test]
    fn prefix_limits_scope() {
        let mut doc = doc();
        transform(json!([{ "pathPrefix": ["components"], "createProperty": true }]))
            .transform_v3(&mut doc)
            .unwrap();

        let response = &doc.paths["/pets"].get.as_ref().unwrap().responses["200"].value;
        let schema = &response.content["application/json"].schema.as_ref().unwrap().value;
        assert!(schema.properties.is_empty());

        let pet = &doc.components.schemas["Pet"].value;
        assert!(pet.properties.contains_key("pet_type"));
        assert!(pet.required.is_empty());
    }

    #[test]
    fn empty_prefix_applies_everywhere() {
        let mut doc = doc();
        transform(json!([{ "createRequired": true }]))
            .transform_v3(&mut doc)
            .unwrap();

        let response = &doc.paths["/pets"].get.as_ref().unwrap().responses["200"].value;
        let schema = &response.content["application/json"].schema.as_ref().unwrap().value;
        assert_eq!(schema.required, ["kind"]);
    }

    #[test]
    fn applying_twice_changes_nothing() {
        let transform = transform(json!([{ "createProperty": true, "createRequired": true }]));
        let mut once = doc();
        transform.transform_v3(&mut once).unwrap();
        let mut twice = once.clone();
        transform.transform_v3(&mut twice).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = DiscriminatorTransform::default()
            .configure(&json!([{ "prefix": ["components"] }]))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            ConfigError::Decode { ref transform, .. } if transform == "discriminator"
        ));
    }
}
