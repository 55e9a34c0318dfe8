//! Converts raw parameter text into typed JSON according to a schema.
//!
//! Dispatch is on the schema's `type`:
//! - `integer`, `number`: parsed, failing with `ConversionError` on bad text
//! - `boolean`: `"true"` is `true`, anything else `false` (never fails unless
//!   [`ParamConfig::strict_booleans`] is set)
//! - `object`: every key converted against its `properties` entry; unknown
//!   keys are a `SchemaMismatch`
//! - `array`: `prefixItems` positionally, then `items` for the rest; trailing
//!   elements stay raw when `items` is absent
//! - anything else (including no schema): the raw value, unchanged
//!
//! A boolean sub-schema `true` passes its value through unchanged. `false`
//! admits no value, so a property or element that lands on it (for example an
//! element past a `prefixItems` tuple closed with `items: false`) is a
//! `MalformedValue`.
//!
//! `format` and other keywords are ignored.

use crate::error::ParamError;
use crate::runtime_config::ParamConfig;
use crate::spec::{RawValue, Schema, SchemaKind, SubSchema};
use serde_json::{Map, Number, Value};

/// Convert a raw parameter value with the default [`ParamConfig`].
///
/// # Arguments
///
/// * `value` - Raw value recovered by the extractor
/// * `schema` - Parameter schema; `None` returns the value as JSON strings
///
/// # Returns
///
/// The typed JSON value, or `UnsupportedSchema` if `schema` contains a `$ref`
/// anywhere, `ConversionError`, `SchemaMismatch` or `MalformedValue` when the
/// value does not fit the schema.
pub fn convert(value: &RawValue, schema: Option<&Schema>) -> Result<Value, ParamError> {
    Converter::default().convert_checked(value, schema)
}

/// Stateless schema-driven converter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter {
    config: ParamConfig,
}

impl Converter {
    #[must_use]
    pub fn new(config: ParamConfig) -> Self {
        Converter { config }
    }

    /// Convert `value` after checking the whole schema for `$ref`.
    ///
    /// # Arguments
    ///
    /// * `value` - Raw value recovered by the extractor
    /// * `schema` - Parameter schema; `None` returns the value as JSON strings
    ///
    /// # Returns
    ///
    /// The typed JSON value. Fails with `UnsupportedSchema` before any
    /// conversion when the schema holds a `$ref`.
    pub fn convert_checked(
        &self,
        value: &RawValue,
        schema: Option<&Schema>,
    ) -> Result<Value, ParamError> {
        if let Some(reference) = schema.and_then(Schema::find_ref) {
            return Err(ParamError::UnsupportedSchema { reference });
        }
        self.convert(value, schema, "")
    }

    fn convert(
        &self,
        value: &RawValue,
        schema: Option<&Schema>,
        path: &str,
    ) -> Result<Value, ParamError> {
        let Some(schema) = schema else {
            return Ok(value.to_json());
        };
        match schema.kind() {
            SchemaKind::Integer => {
                let text = expect_text(value, "integer", path)?;
                parse_integer(text)
            }
            SchemaKind::Number => {
                let text = expect_text(value, "number", path)?;
                parse_number(text)
            }
            SchemaKind::Boolean => {
                let text = expect_text(value, "boolean", path)?;
                self.parse_boolean(text)
            }
            SchemaKind::Object => match value {
                RawValue::Map(map) => self.convert_object(map, schema, path),
                other => Err(shape_error(path, "object", other)),
            },
            SchemaKind::Array => match value {
                RawValue::List(items) => self.convert_array(items, schema, path),
                other => Err(shape_error(path, "array", other)),
            },
            SchemaKind::Other => Ok(value.to_json()),
        }
    }

    fn convert_object(
        &self,
        map: &std::collections::BTreeMap<String, RawValue>,
        schema: &Schema,
        path: &str,
    ) -> Result<Value, ParamError> {
        let mut out = Map::new();
        for (key, raw) in map {
            let key_path = child_path(path, key);
            let Some(sub_schema) = schema.property(key) else {
                return Err(ParamError::SchemaMismatch { key: key_path });
            };
            let converted = self.convert_sub(raw, Some(sub_schema), &key_path)?;
            out.insert(key.clone(), converted);
        }
        Ok(Value::Object(out))
    }

    fn convert_array(
        &self,
        items: &[RawValue],
        schema: &Schema,
        path: &str,
    ) -> Result<Value, ParamError> {
        let item_schema = schema.items.as_deref();
        let prefix = schema.prefix_items.as_deref().unwrap_or(&[]);
        items
            .iter()
            .enumerate()
            .map(|(index, raw)| {
                let element_path = format!("{}[{}]", path, index);
                let sub_schema = prefix.get(index).or(item_schema);
                self.convert_sub(raw, sub_schema, &element_path)
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }

    fn convert_sub(
        &self,
        value: &RawValue,
        schema: Option<&SubSchema>,
        path: &str,
    ) -> Result<Value, ParamError> {
        match schema {
            Some(SubSchema::Schema(schema)) => self.convert(value, Some(schema), path),
            Some(SubSchema::Bool(false)) => Err(ParamError::malformed(
                path,
                "schema `false` admits no value here",
            )),
            Some(SubSchema::Bool(true)) | None => Ok(value.to_json()),
        }
    }

    fn parse_boolean(&self, text: &str) -> Result<Value, ParamError> {
        match text {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            // Known looseness: anything but "true" reads as false.
            _ if !self.config.strict_booleans => Ok(Value::Bool(false)),
            _ => Err(ParamError::ConversionError {
                expected: "boolean",
                value: text.to_string(),
            }),
        }
    }
}

fn parse_integer(text: &str) -> Result<Value, ParamError> {
    text.parse::<i64>()
        .map(Value::from)
        .map_err(|_| ParamError::ConversionError {
            expected: "integer",
            value: text.to_string(),
        })
}

fn parse_number(text: &str) -> Result<Value, ParamError> {
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| ParamError::ConversionError {
            expected: "number",
            value: text.to_string(),
        })
}

fn expect_text<'a>(
    value: &'a RawValue,
    expected: &str,
    path: &str,
) -> Result<&'a str, ParamError> {
    value
        .as_str()
        .ok_or_else(|| shape_error(path, expected, value))
}

fn shape_error(path: &str, expected: &str, found: &RawValue) -> ParamError {
    let name = if path.is_empty() { "value" } else { path };
    ParamError::malformed(
        name,
        format!("expected {} input, got a {}", expected, found.shape()),
    )
}

fn child_path(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}
