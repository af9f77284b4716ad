//! Integration tests for configured transform pipelines.

use serde_json::json;

use openapi_transform::{
    format_document, load_document_str, ConfigError, Document, OutputFormat, Pipeline, Schema,
    TransformConfig, TransformError, TransformRegistry, VersionedDocument,
};

const PETSTORE: &str = include_str!("fixtures/petstore.yaml");

fn petstore() -> VersionedDocument {
    load_document_str(PETSTORE).unwrap()
}

fn pipeline(config: &str) -> Pipeline {
    let config = TransformConfig::parse(config).unwrap();
    Pipeline::from_config(&TransformRegistry::builtin(), &config).unwrap()
}

fn apply(config: &str) -> Document {
    let mut doc = petstore();
    pipeline(config).apply(&mut doc).unwrap();
    doc.as_v3().unwrap().clone()
}

fn schema<'a>(doc: &'a Document, name: &str) -> &'a Schema {
    &doc.components.schemas[name].value
}

fn property<'a>(doc: &'a Document, name: &str, property: &str) -> &'a Schema {
    &schema(doc, name).properties[property].value
}

// === Discriminator ===

mod discriminator {
    use super::*;

    const CONFIG: &str = r#"
configs:
  - discriminator:
      - pathPrefix: [components, schemas]
        createProperty: true
        createRequired: true
"#;

    #[test]
    fn adds_property_and_required() {
        let doc = apply(CONFIG);
        let pet = schema(&doc, "Pet");
        assert_eq!(pet.properties["pet_type"].value, Schema::typed("string"));
        assert_eq!(pet.required, ["name", "pet_type"]);
    }

    #[test]
    fn second_application_adds_nothing() {
        let pipeline = pipeline(CONFIG);
        let mut doc = petstore();
        pipeline.apply(&mut doc).unwrap();
        let once = doc.clone();
        pipeline.apply(&mut doc).unwrap();
        assert_eq!(doc, once);
    }
}

// === Enums ===

mod enums {
    use super::*;

    #[test]
    fn flattens_date_placeholder() {
        let doc = apply(
            r#"
configs:
  - enums:
      flatten_single_enum:
        - match: date
          type: string
          format: date
          example: "2019-09-12"
"#,
        );

        let day = property(&doc, "Period", "day");
        assert!(day.enum_values.is_empty());
        assert_eq!(day.schema_type.as_deref(), Some("string"));
        assert_eq!(day.format.as_deref(), Some("date"));
        assert_eq!(day.example, Some(json!("2019-09-12")));

        // Parameter schemas are reached too.
        let born = doc.paths["/pets"].get.as_ref().unwrap().parameters[1]
            .value
            .schema
            .as_ref()
            .unwrap();
        assert_eq!(born.value.format.as_deref(), Some("date"));
    }
}

// === Rewrites ===

mod rewrites {
    use super::*;

    #[test]
    fn rewrites_examples_of_string_fields() {
        let doc = apply(
            r#"
configs:
  - rewrites:
      rewrites:
        - replace: example
          rewrite: "/^example_replacement$/something-new/"
          match:
            type: string
"#,
        );

        assert_eq!(property(&doc, "Pet", "name").example, Some(json!("something-new")));
        assert_eq!(property(&doc, "Pet", "tag").example, Some(json!("untouched")));
    }

    #[test]
    fn restricted_by_property_name() {
        let doc = apply(
            r#"
configs:
  - rewrites:
      rewrites:
        - replace: type
          rewrite: "/^integer_error$/integer/"
          properties: [end]
"#,
        );

        assert_eq!(property(&doc, "Period", "end").schema_type.as_deref(), Some("integer"));
        assert_eq!(
            property(&doc, "Period", "start").schema_type.as_deref(),
            Some("integer_error")
        );
    }
}

// === allOf ===

mod all_of {
    use super::*;

    const IGNORE: &str = r#"
configs:
  - allOf:
      - path: [components, schemas, Cat]
        ignoreNonType: true
"#;

    #[test]
    fn ignore_drops_untyped_member() {
        let doc = apply(IGNORE);
        let cat = schema(&doc, "Cat");
        assert_eq!(cat.all_of.len(), 2);
        assert!(cat.all_of[0].is_reference());
        assert_eq!(cat.all_of[1].value.schema_type.as_deref(), Some("object"));
        assert!(!cat.read_only);
    }

    #[test]
    fn ignore_is_idempotent() {
        let pipeline = pipeline(IGNORE);
        let mut doc = petstore();
        pipeline.apply(&mut doc).unwrap();
        let once = doc.clone();
        pipeline.apply(&mut doc).unwrap();
        assert_eq!(doc, once);
    }

    #[test]
    fn promote_moves_fields_to_owner() {
        let doc = apply(
            r#"
configs:
  - allOf:
      - path: [components, schemas, Cat]
        promoteNonType: [readOnly, description]
"#,
        );
        let cat = schema(&doc, "Cat");
        assert!(cat.read_only);
        assert_eq!(cat.description.as_deref(), Some("cats are read only"));
        assert_eq!(cat.all_of.len(), 2);
    }

    #[test]
    fn merge_moves_fields_to_preceding_member() {
        let doc = apply(
            r#"
configs:
  - allOf:
      - path: [components, schemas, Cat]
        mergeNonType: [readOnly]
"#,
        );
        let cat = schema(&doc, "Cat");
        assert!(cat.all_of[1].value.read_only);
        assert!(!cat.read_only);
    }
}

// === Replacements ===

mod replacements {
    use super::*;

    #[test]
    fn replaces_response() {
        let doc = apply(
            r#"
configs:
  - replacements:
      - path: [components, responses, Error]
        replacement:
          description: Problem details
          content:
            application/problem+json:
              schema:
                type: object
"#,
        );
        let error = &doc.components.responses["Error"].value;
        assert_eq!(error.description.as_deref(), Some("Problem details"));
        assert_eq!(error.content.keys().collect::<Vec<_>>(), ["application/problem+json"]);
    }
}

// === Pipeline behaviour ===

mod pipeline_behaviour {
    use super::*;

    #[test]
    fn transforms_compose_in_order() {
        let doc = apply(
            r#"
configs:
  - enums:
      flatten_single_enum:
        - {match: date, type: string, format: date}
  - rewrites:
      rewrites:
        - {replace: format, rewrite: "/^date$/date-time/", properties: [day]}
  - discriminator:
      - {pathPrefix: [components, schemas, Pet], createProperty: true}
"#,
        );
        assert_eq!(property(&doc, "Period", "day").format.as_deref(), Some("date-time"));
        assert!(schema(&doc, "Pet").properties.contains_key("pet_type"));
    }

    #[test]
    fn unknown_transform_is_fatal() {
        let config = TransformConfig::parse(
            "configs:\n  - enums:\n      flatten_single_enum: []\n  - inline: {}\n",
        )
        .unwrap();
        let err = Pipeline::from_config(&TransformRegistry::builtin(), &config).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTransform { ref name, .. } if name == "inline"));
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("installed: allOf, discriminator"));
    }

    #[test]
    fn rule_failure_reports_path_and_rule() {
        let mut doc = petstore();
        let err = pipeline(
            r#"
configs:
  - discriminator:
      - {createRequired: true}
  - rewrites:
      rewrites:
        - {replace: type, rewrite: "/^never$/x/"}
        - {replace: x-order, rewrite: "/a/b/"}
"#,
        )
        .apply(&mut doc)
        .unwrap_err();

        assert_eq!(
            err.to_string(),
            "rewrites: rule 1 failed at allOf:2: x-order is not a string"
        );
        assert_eq!(err.exit_code(), 1);
        // The discriminator step ran before the failure.
        let doc = doc.as_v3().unwrap();
        assert!(schema(doc, "Pet").required.contains(&"pet_type".to_string()));
    }

    #[test]
    fn swagger_documents_are_declined() {
        let mut doc = load_document_str("swagger: \"2.0\"\ninfo: {title: t, version: \"1\"}\n").unwrap();
        let err = pipeline("configs:\n  - discriminator: []\n")
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, TransformError::NotImplementedForVariant { .. }));
        assert_eq!(err.to_string(), "discriminator: not implemented for v2 documents");
    }
}

// === Round trip ===

mod round_trip {
    use super::*;

    #[test]
    fn formatted_documents_load_back_equal() {
        let doc = petstore();
        for format in [OutputFormat::Json, OutputFormat::Yaml] {
            let text = format_document(&doc, format).unwrap();
            let reloaded = load_document_str(&text).unwrap();
            assert_eq!(reloaded, doc, "{:?}", format);
        }
    }

    #[test]
    fn transformed_documents_round_trip() {
        let mut doc = petstore();
        pipeline(
            r#"
configs:
  - allOf:
      - {path: [components, schemas, Cat], ignoreNonType: true}
  - discriminator:
      - {createProperty: true, createRequired: true}
"#,
        )
        .apply(&mut doc)
        .unwrap();

        let text = format_document(&doc, OutputFormat::Json).unwrap();
        assert!(text.contains("\"$ref\": \"#/components/schemas/Pet\""));
        assert_eq!(load_document_str(&text).unwrap(), doc);
    }
}
