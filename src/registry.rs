//! Named transforms and the registry they are looked up in.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;
use tracing::warn;

use crate::error::{ConfigError, TransformError};
use crate::model::{Document, DocumentVariant, VersionedDocument};
use crate::transforms::{
    AllOfTransform, DiscriminatorTransform, EnumsTransform, ReplacementTransform,
    RewriteTransform,
};

/// A named set of rules applied to a document.
///
/// A registered transform is unconfigured; [`Transform::configure`] decodes
/// a configuration payload into a new, configured transform.
pub trait Transform: Send + Sync {
    /// Name used in configuration files.
    fn name(&self) -> &'static str;

    /// Human readable description followed by the configured options.
    fn describe(&self) -> String;

    /// Decode `payload` into a configured copy of this transform.
    fn configure(&self, payload: &Value) -> Result<Box<dyn Transform>, ConfigError>;

    /// Apply the configured rules to an OpenAPI v3 document.
    fn transform_v3(&self, doc: &mut Document) -> Result<(), TransformError>;

    /// Apply the configured rules to a Swagger 2.0 document.
    fn transform_v2(&self, _doc: &mut Value) -> Result<(), TransformError> {
        Err(TransformError::NotImplementedForVariant {
            transform: self.name().to_string(),
            variant: DocumentVariant::V2,
        })
    }

    /// Dispatch on the document variant.
    fn transform(&self, doc: &mut VersionedDocument) -> Result<(), TransformError> {
        match doc {
            VersionedDocument::V2(value) => self.transform_v2(value),
            VersionedDocument::V3(doc) => self.transform_v3(doc),
        }
    }
}

/// Collects transforms before the registry is frozen.
#[derive(Default)]
pub struct RegistryBuilder {
    transforms: BTreeMap<&'static str, Box<dyn Transform>>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a transform under its name. A later registration with the
    /// same name replaces the earlier one.
    pub fn register<T: Transform + 'static>(&mut self, transform: T) -> &mut Self {
        let name = transform.name();
        if self.transforms.insert(name, Box::new(transform)).is_some() {
            warn!(transform = name, "transform registered twice, keeping the latest");
        }
        self
    }

    pub fn build(self) -> TransformRegistry {
        TransformRegistry {
            transforms: self.transforms,
        }
    }
}

/// Read-only lookup of transforms by name.
pub struct TransformRegistry {
    transforms: BTreeMap<&'static str, Box<dyn Transform>>,
}

impl TransformRegistry {
    /// A registry holding every built-in transform.
    pub fn builtin() -> Self {
        let mut builder = RegistryBuilder::new();
        builder
            .register(AllOfTransform::default())
            .register(DiscriminatorTransform::default())
            .register(EnumsTransform::default())
            .register(ReplacementTransform::default())
            .register(RewriteTransform::default());
        builder.build()
    }

    pub fn get(&self, name: &str) -> Option<&dyn Transform> {
        self.transforms.get(name).map(|transform| &**transform)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&'static str> {
        self.transforms.keys().copied().collect()
    }

    /// Registered transforms, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Transform> {
        self.transforms.values().map(|transform| &**transform)
    }
}

impl fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformRegistry")
            .field("transforms", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Marker(&'static str);

    impl Transform for Marker {
        fn name(&self) -> &'static str {
            "marker"
        }

        fn describe(&self) -> String {
            self.0.to_string()
        }

        fn configure(&self, _payload: &Value) -> Result<Box<dyn Transform>, ConfigError> {
            Ok(Box::new(Marker(self.0)))
        }

        fn transform_v3(&self, doc: &mut Document) -> Result<(), TransformError> {
            doc.info.title = self.0.to_string();
            Ok(())
        }
    }

    #[test]
    fn builtin_names() {
        let registry = TransformRegistry::builtin();
        assert_eq!(
            registry.names(),
            ["allOf", "discriminator", "enums", "replacements", "rewrites"]
        );
        assert!(registry.get("enums").is_some());
        assert!(registry.get("flatten").is_none());
    }

    #[test]
    fn last_registration_wins() {
        let mut builder = RegistryBuilder::new();
        builder.register(Marker("first")).register(Marker("second"));
        let registry = builder.build();

        assert_eq!(registry.names(), ["marker"]);
        assert_eq!(registry.get("marker").unwrap().describe(), "second");
    }

    #[test]
    fn v2_is_declined_by_default() {
        let mut doc = VersionedDocument::V2(serde_json::json!({ "swagger": "2.0" }));
        let err = Marker("x").transform(&mut doc).unwrap_err();
        assert!(matches!(
            err,
            TransformError::NotImplementedForVariant {
                variant: DocumentVariant::V2,
                ..
            }
        ));
    }

    #[test]
    fn dispatches_v3() {
        let mut doc = VersionedDocument::V3(Box::default());
        Marker("renamed").transform(&mut doc).unwrap();
        assert_eq!(doc.as_v3().unwrap().info.title, "renamed");
    }

    #[test]
    fn registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TransformRegistry>();
    }
}
