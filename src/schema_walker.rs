//! Traversal of the schemas of a document.
//!
//! Unlike [`crate::Walker`] this only reaches schemas: those in
//! `components.schemas`, parameter schemas, and the schemas of response and
//! request body content, recursively through their compositions, items and
//! properties. Each schema is reported with its structural parent. Schemas
//! carrying a `$ref` are still descended into; an unresolved reference
//! simply has nothing below it.

use crate::model::{
    AdditionalProperties, Document, MediaType, Operation, ParameterRef, RequestBodyRef,
    ResponseRef, SchemaRef,
};
use std::collections::BTreeMap;
use std::fmt;

/// What a schema hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaParent<'a> {
    /// An entry of `components.schemas`.
    Registry { name: &'a str },
    /// The `schema` of a parameter.
    Parameter { name: &'a str },
    /// The `schema` of a content media type.
    Content { media_type: &'a str },
    /// An entry of a schema's `properties`.
    Property { name: &'a str },
    AllOf(usize),
    AnyOf(usize),
    OneOf(usize),
    Not,
    Items,
    AdditionalProperties,
}

impl SchemaParent<'_> {
    /// The property name, if the schema is a property of another schema.
    pub fn property_name(&self) -> Option<&str> {
        match self {
            SchemaParent::Property { name } => Some(name),
            _ => None,
        }
    }
}

/// Path-like rendering relative to the nearest named anchor, used in error
/// messages.
impl fmt::Display for SchemaParent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaParent::Registry { name } => write!(f, "components:schemas:{}", name),
            SchemaParent::Parameter { name } => write!(f, "parameters:{}:schema", name),
            SchemaParent::Content { media_type } => write!(f, "content:{}:schema", media_type),
            SchemaParent::Property { name } => write!(f, "properties:{}", name),
            SchemaParent::AllOf(i) => write!(f, "allOf:{}", i),
            SchemaParent::AnyOf(i) => write!(f, "anyOf:{}", i),
            SchemaParent::OneOf(i) => write!(f, "oneOf:{}", i),
            SchemaParent::Not => f.write_str("not"),
            SchemaParent::Items => f.write_str("items"),
            SchemaParent::AdditionalProperties => f.write_str("additionalProperties"),
        }
    }
}

/// Call `visitor` for every reachable schema, parents before children.
pub fn walk_schemas<F>(doc: &mut Document, mut visitor: F)
where
    F: FnMut(&SchemaParent<'_>, &mut SchemaRef),
{
    let visitor = &mut visitor;
    let components = &mut doc.components;

    for (name, schema) in components.schemas.iter_mut() {
        descend(&SchemaParent::Registry { name }, schema, visitor);
    }
    for parameter in components.parameters.values_mut() {
        parameter_schemas(parameter, visitor);
    }
    for response in components.responses.values_mut() {
        response_schemas(response, visitor);
    }
    for body in components.request_bodies.values_mut() {
        request_body_schemas(body, visitor);
    }

    for item in doc.paths.values_mut() {
        for parameter in item.parameters.iter_mut() {
            parameter_schemas(parameter, visitor);
        }
        for (_, operation) in item.operations_mut() {
            if let Some(operation) = operation {
                operation_schemas(operation, visitor);
            }
        }
    }
}

fn operation_schemas<F>(operation: &mut Operation, visitor: &mut F)
where
    F: FnMut(&SchemaParent<'_>, &mut SchemaRef),
{
    for parameter in operation.parameters.iter_mut() {
        parameter_schemas(parameter, visitor);
    }
    if let Some(body) = operation.request_body.as_mut() {
        request_body_schemas(body, visitor);
    }
    for response in operation.responses.values_mut() {
        response_schemas(response, visitor);
    }
}

fn parameter_schemas<F>(parameter: &mut ParameterRef, visitor: &mut F)
where
    F: FnMut(&SchemaParent<'_>, &mut SchemaRef),
{
    let parameter = &mut parameter.value;
    if let Some(schema) = parameter.schema.as_mut() {
        let name = parameter.name.as_str();
        descend(&SchemaParent::Parameter { name }, schema, visitor);
    }
    content_schemas(&mut parameter.content, visitor);
}

fn response_schemas<F>(response: &mut ResponseRef, visitor: &mut F)
where
    F: FnMut(&SchemaParent<'_>, &mut SchemaRef),
{
    content_schemas(&mut response.value.content, visitor);
}

fn request_body_schemas<F>(body: &mut RequestBodyRef, visitor: &mut F)
where
    F: FnMut(&SchemaParent<'_>, &mut SchemaRef),
{
    content_schemas(&mut body.value.content, visitor);
}

fn content_schemas<F>(content: &mut BTreeMap<String, MediaType>, visitor: &mut F)
where
    F: FnMut(&SchemaParent<'_>, &mut SchemaRef),
{
    for (media_type, media) in content.iter_mut() {
        if let Some(schema) = media.schema.as_mut() {
            descend(&SchemaParent::Content { media_type }, schema, visitor);
        }
    }
}

fn descend<F>(parent: &SchemaParent<'_>, schema: &mut SchemaRef, visitor: &mut F)
where
    F: FnMut(&SchemaParent<'_>, &mut SchemaRef),
{
    visitor(parent, schema);

    let schema = &mut schema.value;
    for (i, member) in schema.all_of.iter_mut().enumerate() {
        descend(&SchemaParent::AllOf(i), member, visitor);
    }
    for (i, member) in schema.any_of.iter_mut().enumerate() {
        descend(&SchemaParent::AnyOf(i), member, visitor);
    }
    for (i, member) in schema.one_of.iter_mut().enumerate() {
        descend(&SchemaParent::OneOf(i), member, visitor);
    }
    if let Some(not) = schema.not.as_deref_mut() {
        descend(&SchemaParent::Not, not, visitor);
    }
    if let Some(items) = schema.items.as_deref_mut() {
        descend(&SchemaParent::Items, items, visitor);
    }
    for (name, property) in schema.properties.iter_mut() {
        descend(&SchemaParent::Property { name }, property, visitor);
    }
    if let Some(AdditionalProperties::Schema(additional)) = schema.additional_properties.as_mut() {
        descend(&SchemaParent::AdditionalProperties, additional, visitor);
    }
}
