//! Document loading and serialization.
//!
//! Handles loading documents from files, strings, and HTTP URLs, detecting
//! the document variant, rendering documents back to JSON or YAML, and
//! inlining local schema references.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::LoadError;
use crate::model::{Document, Schema, SchemaRef, VersionedDocument};
use crate::walker::{Node, Walker};

#[cfg(feature = "remote")]
use std::time::Duration;

/// Default timeout for HTTP requests (10 seconds).
#[cfg(feature = "remote")]
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

const LOCAL_SCHEMA_PREFIX: &str = "#/components/schemas/";

/// Load a document from a file path.
///
/// # Errors
///
/// Returns `LoadError::FileNotFound` if the file doesn't exist, or a parse
/// error if it isn't a JSON or YAML document of a supported version.
pub fn load_document(path: &Path) -> Result<VersionedDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| LoadError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_document_str(&content)
}

/// Load a document from a string.
///
/// Text starting with `{` is parsed as JSON, anything else as YAML.
pub fn load_document_str(content: &str) -> Result<VersionedDocument, LoadError> {
    let value: Value = if content.trim_start().starts_with('{') {
        serde_json::from_str(content).map_err(|source| LoadError::InvalidJson { source })?
    } else {
        serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })?
    };
    document_from_value(value)
}

/// Detect the variant of a parsed document and build it.
///
/// `swagger: "2.0"` documents are kept untyped; `openapi: 3.0.x` documents
/// are decoded into the typed model. The model follows OpenAPI 3.0, so 3.1
/// documents are rejected as unsupported rather than half decoded.
pub fn document_from_value(mut value: Value) -> Result<VersionedDocument, LoadError> {
    if !value.is_object() {
        return Err(LoadError::InvalidDocument {
            message: "expected a mapping at the top level".into(),
        });
    }

    if let Some(version) = value.get("swagger") {
        let version = version_text(version);
        if version == "2.0" {
            return Ok(VersionedDocument::V2(value));
        }
        return Err(LoadError::UnsupportedVersion { version });
    }

    let version = match value.get("openapi") {
        Some(version) => version_text(version),
        None => {
            return Err(LoadError::InvalidDocument {
                message: "missing \"openapi\" or \"swagger\" version field".into(),
            })
        }
    };
    if version != "3.0" && !version.starts_with("3.0.") {
        return Err(LoadError::UnsupportedVersion { version });
    }
    // An unquoted YAML version parses as a number.
    value["openapi"] = Value::String(version);

    let doc: Document = serde_json::from_value(value).map_err(|e| LoadError::InvalidDocument {
        message: e.to_string(),
    })?;
    Ok(VersionedDocument::V3(Box::new(doc)))
}

fn version_text(version: &Value) -> String {
    match version {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Load a document from an HTTP/HTTPS URL.
///
/// Requires the `remote` feature (enabled by default).
///
/// # Errors
///
/// Returns `LoadError::NetworkError` if the request fails, or a parse error
/// if the response isn't a supported document.
#[cfg(feature = "remote")]
pub fn load_document_url(url: &str) -> Result<VersionedDocument, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(network_error)?;

    let response = client.get(url).send().map_err(network_error)?;

    // Check for HTTP errors before parsing
    let response = response.error_for_status().map_err(network_error)?;

    let content = response.text().map_err(network_error)?;
    load_document_str(&content)
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Load a document from a file path or, with the `remote` feature, a URL.
pub fn load_document_auto(source: &str) -> Result<VersionedDocument, LoadError> {
    #[cfg(feature = "remote")]
    if is_url(source) {
        return load_document_url(source);
    }
    load_document(Path::new(source))
}

/// Serialization format for documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    /// JSON for `.json` sources, YAML otherwise.
    pub fn from_source(source: &str) -> Self {
        if source.to_ascii_lowercase().ends_with(".json") {
            OutputFormat::Json
        } else {
            OutputFormat::Yaml
        }
    }
}

/// Render a document as JSON or YAML text.
pub fn format_document(doc: &VersionedDocument, format: OutputFormat) -> Result<String, LoadError> {
    match doc {
        VersionedDocument::V2(value) => render(value, format),
        VersionedDocument::V3(doc) => render(doc, format),
    }
}

fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String, LoadError> {
    let serialize_error = |message: String| LoadError::Serialize { message };
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .map(|mut text| {
                text.push('\n');
                text
            })
            .map_err(|e| serialize_error(e.to_string())),
        OutputFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| serialize_error(e.to_string()))
        }
    }
}

/// Fill the value of every local `#/components/schemas/<name>` reference
/// with a copy of its target.
///
/// Each registry entry is resolved once, from its state before resolution
/// started, and the result is copied into every reference to it. A reference
/// that would close a cycle is left unresolved, so cycles terminate. The
/// references themselves are kept, so serialization still emits `$ref`.
pub fn resolve_references(doc: &mut Document) {
    let mut resolver = Resolver::new(doc.components.schemas.clone());
    let result = Walker::new().walk(doc, |_, _, node| {
        if let Node::Schema(schema) = node {
            if schema.is_reference() {
                resolver.inline(schema);
            }
        }
        Ok::<_, Infallible>(true)
    });
    if let Err(never) = result {
        match never {}
    }
}

struct Resolver {
    registry: BTreeMap<String, SchemaRef>,
    resolved: BTreeMap<String, Schema>,
    /// Registry entries currently being resolved.
    stack: Vec<String>,
}

impl Resolver {
    fn new(registry: BTreeMap<String, SchemaRef>) -> Self {
        Self {
            registry,
            resolved: BTreeMap::new(),
            stack: Vec::new(),
        }
    }

    fn inline(&mut self, schema: &mut SchemaRef) {
        let Some(name) = schema
            .reference
            .as_deref()
            .and_then(|reference| reference.strip_prefix(LOCAL_SCHEMA_PREFIX))
        else {
            return;
        };
        if let Some(target) = self.target(name) {
            schema.value = target;
        }
    }

    /// The resolved copy of registry entry `name`, or `None` if it is
    /// missing or already being resolved.
    fn target(&mut self, name: &str) -> Option<Schema> {
        if let Some(resolved) = self.resolved.get(name) {
            return Some(resolved.clone());
        }
        if self.stack.iter().any(|seen| seen == name) {
            return None;
        }
        let mut target = self.registry.get(name)?.clone();

        self.stack.push(name.to_string());
        self.resolve_within(&mut target);
        self.stack.pop();

        self.resolved.insert(name.to_string(), target.value.clone());
        Some(target.value)
    }

    fn resolve_within(&mut self, schema: &mut SchemaRef) {
        if schema.is_reference() {
            self.inline(schema);
            return;
        }
        for child in schema.value.subschemas_mut() {
            self.resolve_within(child);
        }
    }
}
