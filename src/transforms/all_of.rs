//! Cleanup of `allOf` members that carry no type information.
//!
//! Generators sometimes emit `allOf` lists where some members only hold
//! annotations such as `readOnly` or `description`. Depending on the rule
//! such members are dropped, merged into the preceding typed member, or
//! promoted onto the schema owning the `allOf`. The untyped member is
//! removed in every case.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::{decode_error, decode_options, describe_options, rule_error};
use crate::error::{ConfigError, TransformError};
use crate::model::{is_false, Document, Schema, SchemaField, SchemaRef};
use crate::registry::Transform;
use crate::walker::{Node, Walker};

const NAME: &str = "allOf";

const SUMMARY: &str = "
The allOf transform handles allOf lists containing members that are not
schemas with type information. Such members can be ignored (dropped),
promoted onto the schema owning the allOf, or merged into the preceding
typed member. Rules apply to the schema at exactly `path`.";

/// One `allOf` cleanup rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AllOfRule {
    pub path: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ignore_non_type: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub promote_non_type: Vec<SchemaField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merge_non_type: Vec<SchemaField>,
}

enum Policy<'a> {
    Ignore,
    Merge(&'a [SchemaField]),
    Promote(&'a [SchemaField]),
}

impl AllOfRule {
    fn policy(&self) -> Option<Policy<'_>> {
        if self.ignore_non_type {
            Some(Policy::Ignore)
        } else if !self.merge_non_type.is_empty() {
            Some(Policy::Merge(&self.merge_non_type))
        } else if !self.promote_non_type.is_empty() {
            Some(Policy::Promote(&self.promote_non_type))
        } else {
            None
        }
    }

    /// Rewrite the `allOf` of `schema`. On error the untyped member that
    /// could not be handled and every member after it are left in place.
    fn apply(&self, schema: &mut Schema) -> Result<(), String> {
        let Some(policy) = self.policy() else {
            return Ok(());
        };

        let mut kept: Vec<SchemaRef> = Vec::with_capacity(schema.all_of.len());
        let mut members = std::mem::take(&mut schema.all_of).into_iter().enumerate();
        while let Some((index, member)) = members.next() {
            if member.has_type_information() {
                kept.push(member);
                continue;
            }
            match policy {
                Policy::Ignore => {}
                Policy::Promote(fields) => {
                    for field in fields {
                        schema.copy_field(&member.value, field);
                    }
                }
                Policy::Merge(fields) => {
                    let problem = match kept.last() {
                        None => Some(format!(
                            "allOf entry {} has no preceding typed entry to merge into",
                            index
                        )),
                        Some(target) if target.is_reference() => {
                            Some(format!("allOf entry {} cannot be merged into a $ref", index))
                        }
                        Some(_) => None,
                    };
                    if let Some(message) = problem {
                        kept.push(member);
                        kept.extend(members.map(|(_, member)| member));
                        schema.all_of = kept;
                        return Err(message);
                    }
                    if let Some(target) = kept.last_mut() {
                        for field in fields {
                            target.value.copy_field(&member.value, field);
                        }
                    }
                }
            }
        }
        schema.all_of = kept;
        Ok(())
    }
}

fn has_untyped_member(schema: &Schema) -> bool {
    schema.all_of.iter().any(|member| !member.has_type_information())
}

/// The `allOf` transform.
#[derive(Debug, Clone, Default)]
pub struct AllOfTransform {
    rules: Vec<AllOfRule>,
}

impl AllOfTransform {
    pub fn new(rules: Vec<AllOfRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[AllOfRule] {
        &self.rules
    }
}

impl Transform for AllOfTransform {
    fn name(&self) -> &'static str {
        NAME
    }

    fn describe(&self) -> String {
        describe_options(SUMMARY, &self.rules)
    }

    fn configure(&self, payload: &Value) -> Result<Box<dyn Transform>, ConfigError> {
        let rules: Vec<AllOfRule> = decode_options(NAME, payload)?;
        if let Some(index) = rules.iter().position(|rule| rule.policy().is_none()) {
            return Err(decode_error(
                NAME,
                format!(
                    "rule {} sets none of ignoreNonType, mergeNonType or promoteNonType",
                    index
                ),
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
            let Node::Schema(schema) = node else {
                return Ok(true);
            };
            for (index, rule) in self.rules.iter().enumerate() {
                if !path.matches(&rule.path) || !has_untyped_member(&schema.value) {
                    continue;
                }
                rule.apply(&mut schema.value)
                    .map_err(|message| rule_error(NAME, index, path, message))?;
                debug!(path = %path, rule = index, "cleaned up allOf members");
            }
            Ok(true)
        })
    }
}
