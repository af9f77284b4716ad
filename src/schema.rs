//! The schema object and typed partial updates on it.
//!
//! Rules never round-trip a schema through a generic map to edit it. Instead
//! they name the fields they may touch with [`SchemaField`] and use
//! [`Schema::copy_field`], [`Schema::field_text`] and
//! [`Schema::set_field_text`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::model::{explicit_value, is_false, ExternalDocs, Extensions, SchemaRef};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<Value>,
    #[serde(
        default,
        deserialize_with = "explicit_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    #[serde(
        default,
        deserialize_with = "explicit_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub read_only: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub write_only: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub deprecated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusive_minimum: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub exclusive_maximum: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub unique_items: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, SchemaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaRef>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<SchemaRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<SchemaRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub one_of: Vec<SchemaRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<SchemaRef>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

/// `additionalProperties` is either a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<SchemaRef>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    #[serde(default)]
    pub property_name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub mapping: BTreeMap<String, String>,
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Schema {
    /// A schema with only `type` set.
    pub fn typed(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(schema_type.into()),
            ..Self::default()
        }
    }

    /// Returns true if the schema carries any type information: a type, an
    /// enum, a composition, or a property that itself has type information.
    pub fn has_type_information(&self) -> bool {
        self.schema_type.is_some()
            || !self.enum_values.is_empty()
            || !self.all_of.is_empty()
            || !self.any_of.is_empty()
            || !self.one_of.is_empty()
            || self.properties.values().any(SchemaRef::has_type_information)
    }

    /// Direct child schemas: compositions, `not`, `items`, properties and a
    /// schema-valued `additionalProperties`.
    pub fn subschemas_mut(&mut self) -> Vec<&mut SchemaRef> {
        let mut children: Vec<&mut SchemaRef> = Vec::new();
        children.extend(self.all_of.iter_mut());
        children.extend(self.any_of.iter_mut());
        children.extend(self.one_of.iter_mut());
        if let Some(not) = self.not.as_deref_mut() {
            children.push(not);
        }
        if let Some(items) = self.items.as_deref_mut() {
            children.push(items);
        }
        children.extend(self.properties.values_mut());
        if let Some(AdditionalProperties::Schema(additional)) =
            self.additional_properties.as_mut()
        {
            children.push(additional);
        }
        children
    }

    /// Copy `field` from `source` into this schema.
    ///
    /// Fields that are unset in `source` leave this schema untouched.
    /// `required` is merged as a set union and `properties` are overlaid
    /// key by key; every other field is replaced.
    pub fn copy_field(&mut self, source: &Schema, field: &SchemaField) {
        fn replace<T: Clone>(target: &mut Option<T>, source: &Option<T>) {
            if source.is_some() {
                target.clone_from(source);
            }
        }

        match field {
            SchemaField::Type => replace(&mut self.schema_type, &source.schema_type),
            SchemaField::Format => replace(&mut self.format, &source.format),
            SchemaField::Title => replace(&mut self.title, &source.title),
            SchemaField::Description => replace(&mut self.description, &source.description),
            SchemaField::Pattern => replace(&mut self.pattern, &source.pattern),
            SchemaField::Example => replace(&mut self.example, &source.example),
            SchemaField::Default => replace(&mut self.default, &source.default),
            SchemaField::Nullable => self.nullable |= source.nullable,
            SchemaField::ReadOnly => self.read_only |= source.read_only,
            SchemaField::WriteOnly => self.write_only |= source.write_only,
            SchemaField::Deprecated => self.deprecated |= source.deprecated,
            SchemaField::Required => {
                for name in &source.required {
                    if !self.required.contains(name) {
                        self.required.push(name.clone());
                    }
                }
            }
            SchemaField::Properties => {
                for (name, property) in &source.properties {
                    self.properties.insert(name.clone(), property.clone());
                }
            }
            SchemaField::Enum => {
                if !source.enum_values.is_empty() {
                    self.enum_values.clone_from(&source.enum_values);
                }
            }
            SchemaField::Items => replace(&mut self.items, &source.items),
            SchemaField::AdditionalProperties => {
                replace(&mut self.additional_properties, &source.additional_properties)
            }
            SchemaField::Extension(name) => {
                if let Some(value) = source.extensions.get(name) {
                    self.extensions.insert(name.clone(), value.clone());
                }
            }
        }
    }

    /// Read `field` as text, for predicates and rewrites.
    pub fn field_text(&self, field: &SchemaField) -> FieldText<'_> {
        fn text(value: Option<&String>) -> FieldText<'_> {
            value.map_or(FieldText::Absent, |s| FieldText::Text(s))
        }

        fn json(value: Option<&Value>) -> FieldText<'_> {
            match value {
                None | Some(Value::Null) => FieldText::Absent,
                Some(Value::String(s)) => FieldText::Text(s),
                Some(_) => FieldText::NotText,
            }
        }

        match field {
            SchemaField::Type => text(self.schema_type.as_ref()),
            SchemaField::Format => text(self.format.as_ref()),
            SchemaField::Title => text(self.title.as_ref()),
            SchemaField::Description => text(self.description.as_ref()),
            SchemaField::Pattern => text(self.pattern.as_ref()),
            SchemaField::Example => json(self.example.as_ref()),
            SchemaField::Default => json(self.default.as_ref()),
            SchemaField::Extension(name) => json(self.extensions.get(name)),
            SchemaField::Nullable => flag(self.nullable),
            SchemaField::ReadOnly => flag(self.read_only),
            SchemaField::WriteOnly => flag(self.write_only),
            SchemaField::Deprecated => flag(self.deprecated),
            SchemaField::Required => flag(!self.required.is_empty()),
            SchemaField::Properties => flag(!self.properties.is_empty()),
            SchemaField::Enum => flag(!self.enum_values.is_empty()),
            SchemaField::Items => flag(self.items.is_some()),
            SchemaField::AdditionalProperties => flag(self.additional_properties.is_some()),
        }
    }

    /// Overwrite a text-valued field.
    ///
    /// Returns false, leaving the schema unchanged, if `field` does not
    /// hold text.
    pub fn set_field_text(&mut self, field: &SchemaField, value: String) -> bool {
        match field {
            SchemaField::Type => self.schema_type = Some(value),
            SchemaField::Format => self.format = Some(value),
            SchemaField::Title => self.title = Some(value),
            SchemaField::Description => self.description = Some(value),
            SchemaField::Pattern => self.pattern = Some(value),
            SchemaField::Example => self.example = Some(Value::String(value)),
            SchemaField::Default => self.default = Some(Value::String(value)),
            SchemaField::Extension(name) => {
                self.extensions.insert(name.clone(), Value::String(value));
            }
            _ => return false,
        }
        true
    }
}

/// Non-text fields only report whether they are set.
fn flag(set: bool) -> FieldText<'static> {
    if set {
        FieldText::NotText
    } else {
        FieldText::Absent
    }
}

impl SchemaRef {
    /// Returns true for a reference or for an inline schema with type
    /// information.
    pub fn has_type_information(&self) -> bool {
        self.is_reference() || self.value.has_type_information()
    }
}

/// Result of reading a schema field as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldText<'a> {
    /// The field is not set.
    Absent,
    /// The field holds a string.
    Text(&'a str),
    /// The field is set to something other than a string.
    NotText,
}

/// A schema field a rule may read or update.
///
/// Names use the document spelling (`readOnly`, `additionalProperties`);
/// any `x-` prefixed name refers to an extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SchemaField {
    Type,
    Format,
    Title,
    Description,
    Pattern,
    Example,
    Default,
    Nullable,
    ReadOnly,
    WriteOnly,
    Deprecated,
    Required,
    Properties,
    Enum,
    Items,
    AdditionalProperties,
    Extension(String),
}

impl SchemaField {
    /// Returns true for fields that can hold a string, and so can be
    /// compared against or rewritten as text.
    pub fn holds_text(&self) -> bool {
        matches!(
            self,
            SchemaField::Type
                | SchemaField::Format
                | SchemaField::Title
                | SchemaField::Description
                | SchemaField::Pattern
                | SchemaField::Example
                | SchemaField::Default
                | SchemaField::Extension(_)
        )
    }

    pub fn as_str(&self) -> &str {
        match self {
            SchemaField::Type => "type",
            SchemaField::Format => "format",
            SchemaField::Title => "title",
            SchemaField::Description => "description",
            SchemaField::Pattern => "pattern",
            SchemaField::Example => "example",
            SchemaField::Default => "default",
            SchemaField::Nullable => "nullable",
            SchemaField::ReadOnly => "readOnly",
            SchemaField::WriteOnly => "writeOnly",
            SchemaField::Deprecated => "deprecated",
            SchemaField::Required => "required",
            SchemaField::Properties => "properties",
            SchemaField::Enum => "enum",
            SchemaField::Items => "items",
            SchemaField::AdditionalProperties => "additionalProperties",
            SchemaField::Extension(name) => name,
        }
    }
}

impl fmt::Display for SchemaField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let field = match s {
            "type" => SchemaField::Type,
            "format" => SchemaField::Format,
            "title" => SchemaField::Title,
            "description" => SchemaField::Description,
            "pattern" => SchemaField::Pattern,
            "example" => SchemaField::Example,
            "default" => SchemaField::Default,
            "nullable" => SchemaField::Nullable,
            "readOnly" => SchemaField::ReadOnly,
            "writeOnly" => SchemaField::WriteOnly,
            "deprecated" => SchemaField::Deprecated,
            "required" => SchemaField::Required,
            "properties" => SchemaField::Properties,
            "enum" => SchemaField::Enum,
            "items" => SchemaField::Items,
            "additionalProperties" => SchemaField::AdditionalProperties,
            ext if ext.starts_with("x-") => SchemaField::Extension(ext.to_string()),
            other => return Err(format!("unknown schema field \"{}\"", other)),
        };
        Ok(field)
    }
}

impl TryFrom<String> for SchemaField {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SchemaField> for String {
    fn from(field: SchemaField) -> Self {
        field.as_str().to_string()
    }
}
