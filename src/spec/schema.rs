use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Schema type after classification; anything else is passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Integer,
    Number,
    Boolean,
    Object,
    Array,
    Other,
}

/// The subset of a JSON Schema that drives parameter conversion.
///
/// Keywords the converter does not interpret (`format`, `description`,
/// `minimum`, ...) are kept in `extra`, so a schema serializes back to the
/// document it was read from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Schema {
    /// Usually a string; JSON Schema also allows a list, which classifies as `Other`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<Value>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, SubSchema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SubSchema>>,
    #[serde(rename = "prefixItems", default, skip_serializing_if = "Option::is_none")]
    pub prefix_items: Option<Vec<SubSchema>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schema {
    /// The declared type, when it is a single string.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(Value::as_str)
    }

    #[must_use]
    pub fn kind(&self) -> SchemaKind {
        match self.type_name() {
            Some("integer") => SchemaKind::Integer,
            Some("number") => SchemaKind::Number,
            Some("boolean") => SchemaKind::Boolean,
            Some("object") => SchemaKind::Object,
            Some("array") => SchemaKind::Array,
            _ => SchemaKind::Other,
        }
    }

    /// Sub-schema declared for an object key.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&SubSchema> {
        self.properties.as_ref().and_then(|p| p.get(key))
    }

    /// First `$ref` found by a depth-first walk of the whole schema, including
    /// keywords the converter never looks at.
    #[must_use]
    pub fn find_ref(&self) -> Option<String> {
        if let Some(reference) = &self.reference {
            return Some(reference.clone());
        }
        if let Some(found) = self
            .properties
            .iter()
            .flat_map(|p| p.values())
            .find_map(SubSchema::find_ref)
        {
            return Some(found);
        }
        if let Some(found) = self.items.as_deref().and_then(SubSchema::find_ref) {
            return Some(found);
        }
        if let Some(found) = self
            .prefix_items
            .iter()
            .flatten()
            .find_map(SubSchema::find_ref)
        {
            return Some(found);
        }
        self.extra.values().find_map(find_ref_in_value)
    }
}

/// A schema position that also accepts the boolean forms `true` (anything
/// goes) and `false` (nothing is allowed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubSchema {
    Bool(bool),
    Schema(Schema),
}

impl SubSchema {
    /// The object form, `None` for `true` and `false`.
    #[must_use]
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            SubSchema::Schema(schema) => Some(schema),
            SubSchema::Bool(_) => None,
        }
    }

    #[must_use]
    pub fn find_ref(&self) -> Option<String> {
        self.as_schema().and_then(Schema::find_ref)
    }
}

/// Depth-first search for a `$ref` key in an untyped JSON value.
///
/// Runs on raw definitions before they are deserialized, so a malformed
/// reference (non-string target) is still reported as a reference.
pub fn find_ref_in_value(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => {
            if let Some(target) = obj.get("$ref") {
                return Some(match target {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
            }
            obj.values().find_map(find_ref_in_value)
        }
        Value::Array(arr) => arr.iter().find_map(find_ref_in_value),
        _ => None,
    }
}
