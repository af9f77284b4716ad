//! Typed OpenAPI v3 document model.
//!
//! Every object keeps the fields it does not model (including `x-`
//! extensions) in a flattened `extensions` map, so loading and serializing a
//! document does not drop information. Named maps are ordered by key, which
//! makes traversal order stable from run to run.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::schema::{AdditionalProperties, Discriminator, Schema, SchemaField};

/// Unknown and extension fields of an object.
pub type Extensions = BTreeMap<String, Value>;

pub(crate) fn is_false(value: &bool) -> bool {
    !*value
}

/// Present-but-null fields deserialize to `Some(Value::Null)` instead of
/// `None`, so an explicit `null` is written back out.
pub(crate) fn explicit_value<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

/// Either a `$ref` to another object or an inline value.
///
/// A reference is serialized as `{"$ref": ...}` plus any fields written next
/// to it (`siblings`, such as the `summary` and `description` OpenAPI allows
/// beside a reference). `value` is only populated for references when a
/// loader resolves them (see [`crate::resolve_references`]), and is never
/// written back out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ref<T> {
    pub reference: Option<String>,
    pub siblings: Extensions,
    pub value: T,
}

impl<T> Ref<T> {
    /// Wrap an inline value.
    pub fn new(value: T) -> Self {
        Self {
            reference: None,
            siblings: Extensions::new(),
            value,
        }
    }

    /// Create an unresolved reference.
    pub fn reference_to(reference: impl Into<String>) -> Self
    where
        T: Default,
    {
        Self {
            reference: Some(reference.into()),
            siblings: Extensions::new(),
            value: T::default(),
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }
}

impl<T: Serialize> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.reference {
            Some(reference) => {
                let mut map = serializer.serialize_map(Some(1 + self.siblings.len()))?;
                map.serialize_entry("$ref", reference)?;
                for (key, value) in &self.siblings {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            None => self.value.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned + Default> Deserialize<'de> for Ref<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        if let Value::Object(fields) = &raw {
            if let Some(Value::String(reference)) = fields.get("$ref") {
                let mut reference = Self::reference_to(reference.as_str());
                reference.siblings = fields
                    .iter()
                    .filter(|(key, _)| key.as_str() != "$ref")
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                return Ok(reference);
            }
        }
        serde_json::from_value(raw)
            .map(Self::new)
            .map_err(de::Error::custom)
    }
}

pub type SchemaRef = Ref<Schema>;
pub type ParameterRef = Ref<Parameter>;
pub type HeaderRef = Ref<Header>;
pub type RequestBodyRef = Ref<RequestBody>;
pub type ResponseRef = Ref<Response>;
pub type LinkRef = Ref<Link>;
pub type ExampleRef = Ref<Example>;
pub type CallbackRef = Ref<Callback>;
pub type SecuritySchemeRef = Ref<SecurityScheme>;

/// Callback expressions mapped to the path items they describe.
pub type Callback = BTreeMap<String, PathItem>;

/// Security scheme names mapped to required scopes.
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// Which generation of the OpenAPI format a document follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentVariant {
    /// Swagger 2.0.
    V2,
    /// OpenAPI 3.0.
    V3,
}

impl fmt::Display for DocumentVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentVariant::V2 => f.write_str("v2"),
            DocumentVariant::V3 => f.write_str("v3"),
        }
    }
}

/// A loaded document of either variant.
///
/// Swagger 2.0 documents are kept untyped; transforms may decline them.
#[derive(Debug, Clone, PartialEq)]
pub enum VersionedDocument {
    V2(Value),
    V3(Box<Document>),
}

impl VersionedDocument {
    pub fn variant(&self) -> DocumentVariant {
        match self {
            VersionedDocument::V2(_) => DocumentVariant::V2,
            VersionedDocument::V3(_) => DocumentVariant::V3,
        }
    }

    /// The typed document, if this is an OpenAPI v3 document.
    pub fn as_v3(&self) -> Option<&Document> {
        match self {
            VersionedDocument::V3(doc) => Some(doc),
            VersionedDocument::V2(_) => None,
        }
    }

    pub fn as_v3_mut(&mut self) -> Option<&mut Document> {
        match self {
            VersionedDocument::V3(doc) => Some(doc),
            VersionedDocument::V2(_) => None,
        }
    }
}

/// Root of an OpenAPI v3 document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub openapi: String,
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub paths: BTreeMap<String, PathItem>,
    #[serde(default, skip_serializing_if = "Components::is_empty")]
    pub components: Components,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Info {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,
    #[serde(default)]
    pub version: String,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct License {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, ServerVariable>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerVariable {
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default)]
    pub default: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// Reusable objects, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, SchemaRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, ParameterRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub responses: BTreeMap<String, ResponseRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub request_bodies: BTreeMap<String, RequestBodyRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, LinkRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, ExampleRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub callbacks: BTreeMap<String, CallbackRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, SecuritySchemeRef>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Components {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.parameters.is_empty()
            && self.headers.is_empty()
            && self.responses.is_empty()
            && self.request_bodies.is_empty()
            && self.links.is_empty()
            && self.examples.is_empty()
            && self.callbacks.is_empty()
            && self.security_schemes.is_empty()
            && self.extensions.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterRef>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl PathItem {
    /// Operations keyed by HTTP method, in walk order.
    pub fn operations_mut(&mut self) -> [(&'static str, Option<&mut Operation>); 8] {
        [
            ("delete", self.delete.as_mut()),
            ("get", self.get.as_mut()),
            ("head", self.head.as_mut()),
            ("options", self.options.as_mut()),
            ("patch", self.patch.as_mut()),
            ("post", self.post.as_mut()),
            ("put", self.put.as_mut()),
            ("trace", self.trace.as_mut()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBodyRef>,
    #[serde(default)]
    pub responses: BTreeMap<String, ResponseRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub callbacks: BTreeMap<String, CallbackRef>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "in", default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_empty_value: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_reserved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    #[serde(
        default,
        deserialize_with = "explicit_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, ExampleRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// A header: a parameter without `name` and `in`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    #[serde(
        default,
        deserialize_with = "explicit_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, ExampleRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub content: BTreeMap<String, MediaType>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub content: BTreeMap<String, MediaType>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, LinkRef>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaRef>,
    #[serde(
        default,
        deserialize_with = "explicit_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub examples: BTreeMap<String, ExampleRef>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub encoding: BTreeMap<String, Encoding>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, HeaderRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub allow_reserved: bool,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
    #[serde(
        default,
        deserialize_with = "explicit_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub request_body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<Server>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Example {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        deserialize_with = "explicit_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_value: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    #[serde(rename = "type", default)]
    pub scheme_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_id_connect_url: Option<String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub implicit: Option<OAuthFlow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_credentials: Option<OAuthFlow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_code: Option<OAuthFlow>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl OAuthFlows {
    /// Flows keyed by their field name, in walk order.
    pub fn flows_mut(&mut self) -> [(&'static str, Option<&mut OAuthFlow>); 4] {
        [
            ("implicit", self.implicit.as_mut()),
            ("password", self.password.as_mut()),
            ("clientCredentials", self.client_credentials.as_mut()),
            ("authorizationCode", self.authorization_code.as_mut()),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reference_serializes_as_ref_only() {
        let mut schema = SchemaRef::reference_to("#/components/schemas/Pet");
        schema.value.description = Some("resolved copy".into());

        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value, json!({ "$ref": "#/components/schemas/Pet" }));
    }

    #[test]
    fn reference_deserializes_without_value() {
        let schema: SchemaRef =
            serde_json::from_value(json!({ "$ref": "#/components/schemas/Pet" })).unwrap();
        assert_eq!(schema.reference.as_deref(), Some("#/components/schemas/Pet"));
        assert_eq!(schema.value, Schema::default());
    }

    #[test]
    fn reference_siblings_round_trip() {
        let raw = json!({
            "$ref": "#/components/schemas/B",
            "description": "the b",
            "summary": "b"
        });
        let schema: SchemaRef = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(schema.siblings.get("description"), Some(&json!("the b")));
        assert_eq!(schema.value, Schema::default());
        assert_eq!(serde_json::to_value(&schema).unwrap(), raw);
    }

    #[test]
    fn explicit_null_values_round_trip() {
        let raw = json!({ "nullable": true, "default": null, "example": null });
        let schema: Schema = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(schema.default, Some(Value::Null));
        assert_eq!(serde_json::to_value(&schema).unwrap(), raw);

        let absent: Schema = serde_json::from_value(json!({ "nullable": true })).unwrap();
        assert_eq!(absent.default, None);

        let raw = json!({ "schema": { "type": "string" }, "example": null });
        let media: MediaType = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&media).unwrap(), raw);
    }

    #[test]
    fn inline_value_deserializes() {
        let schema: SchemaRef = serde_json::from_value(json!({ "type": "string" })).unwrap();
        assert!(!schema.is_reference());
        assert_eq!(schema.value.schema_type.as_deref(), Some("string"));
    }

    #[test]
    fn unknown_fields_are_preserved() {
        let raw = json!({
            "name": "limit",
            "in": "query",
            "x-internal": true,
            "schema": { "type": "integer", "x-go-type": "int32" }
        });
        let parameter: Parameter = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(parameter.extensions.get("x-internal"), Some(&json!(true)));
        assert_eq!(serde_json::to_value(&parameter).unwrap(), raw);
    }

    #[test]
    fn components_is_empty() {
        let mut components = Components::default();
        assert!(components.is_empty());
        components
            .schemas
            .insert("Pet".into(), SchemaRef::new(Schema::default()));
        assert!(!components.is_empty());
    }

    #[test]
    fn operations_in_walk_order() {
        let mut item = PathItem {
            get: Some(Operation::default()),
            post: Some(Operation::default()),
            ..PathItem::default()
        };
        let present: Vec<&str> = item
            .operations_mut()
            .into_iter()
            .filter_map(|(method, op)| op.map(|_| method))
            .collect();
        assert_eq!(present, ["get", "post"]);
    }

    #[test]
    fn versioned_document_accessors() {
        let doc = VersionedDocument::V3(Box::default());
        assert_eq!(doc.variant(), DocumentVariant::V3);
        assert!(doc.as_v3().is_some());

        let doc = VersionedDocument::V2(json!({ "swagger": "2.0" }));
        assert_eq!(doc.variant(), DocumentVariant::V2);
        assert!(doc.as_v3().is_none());
        assert_eq!(DocumentVariant::V2.to_string(), "v2");
    }
}
