//! OpenAPI Transform
//!
//! Walks OpenAPI v3 documents and rewrites them with configurable,
//! rule-based transforms.
//!
//! A document is loaded into a typed model, a [`Pipeline`] of transforms is
//! built from a YAML configuration, and the pipeline edits the document in
//! place before it is written back out.
//!
//! # Example
//!
//! ```
//! use openapi_transform::{load_document_str, Pipeline, TransformConfig, TransformRegistry};
//!
//! let mut doc = load_document_str(
//!     r#"
//! openapi: 3.0.3
//! info: {title: Events, version: "1"}
//! paths: {}
//! components:
//!   schemas:
//!     Day:
//!       enum: [date]
//! "#,
//! )
//! .unwrap();
//!
//! let config = TransformConfig::parse(
//!     r#"
//! configs:
//!   - enums:
//!       flatten_single_enum:
//!         - match: date
//!           type: string
//!           format: date
//! "#,
//! )
//! .unwrap();
//!
//! let pipeline = Pipeline::from_config(&TransformRegistry::builtin(), &config).unwrap();
//! pipeline.apply(&mut doc).unwrap();
//!
//! let day = &doc.as_v3().unwrap().components.schemas["Day"].value;
//! assert_eq!(day.format.as_deref(), Some("date"));
//! assert!(day.enum_values.is_empty());
//! ```
//!
//! # Transforms
//!
//! | Name | Finds nodes with | Edit |
//! |------|------------------|------|
//! | `allOf` | the document walker, exact path | drop, merge or promote untyped `allOf` members |
//! | `discriminator` | the document walker, path prefix | add the property and mark it required |
//! | `enums` | the schema walker | turn a single placeholder enum into a typed leaf |
//! | `replacements` | the document walker, exact path | replace the node |
//! | `rewrites` | the schema walker | regex rewrite of a string field |
//!
//! # Walking
//!
//! [`Walker`] visits every node of a document with its [`StructuralPath`]
//! and can be restricted to path prefixes. [`walk_schemas`] only visits
//! schemas and reports each with its [`SchemaParent`].

mod config;
mod error;
mod loader;
mod model;
mod path;
mod pipeline;
mod registry;
mod schema;
mod schema_walker;
pub mod transforms;
mod walker;

pub use config::{ConfigEntry, TransformConfig};
pub use error::{ConfigError, LoadError, TransformError};
pub use loader::{
    document_from_value, format_document, is_url, load_document, load_document_auto,
    load_document_str, resolve_references, OutputFormat,
};
pub use model::*;
pub use path::{is_exact_match, is_prefix_match, StructuralPath, PATH_SEPARATOR};
pub use pipeline::Pipeline;
pub use registry::{RegistryBuilder, Transform, TransformRegistry};
pub use schema::FieldText;
pub use schema_walker::{walk_schemas, SchemaParent};
pub use walker::{Node, NodeKind, Walker};

#[cfg(feature = "remote")]
pub use loader::load_document_url;
