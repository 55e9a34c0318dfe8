use super::schema::{find_ref_in_value, Schema, SchemaKind};
use super::types::{ParameterDefinition, ParameterLocation, ParameterStyle, RawValue};
use crate::converter::Converter;
use crate::error::ParamError;
use crate::extractor;
use crate::runtime_config::ParamConfig;
use crate::server::RequestView;
use serde_json::Value;
use tracing::debug;

/// A validated parameter definition with its serialization rules resolved.
///
/// Construction fails fast: an unknown `in`, an unknown `style` or a `$ref`
/// anywhere in the schema is rejected here, never at request time. Once built
/// the spec is immutable and can be shared across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSpec {
    name: String,
    location: ParameterLocation,
    style: ParameterStyle,
    explode: bool,
    required: bool,
    schema: Option<Schema>,
    config: ParamConfig,
}

impl ParameterSpec {
    pub fn new(definition: ParameterDefinition) -> Result<Self, ParamError> {
        Self::with_config(definition, ParamConfig::default())
    }

    pub fn with_config(
        definition: ParameterDefinition,
        config: ParamConfig,
    ) -> Result<Self, ParamError> {
        let ParameterDefinition {
            name,
            location,
            schema,
            style,
            explode,
            required,
            ..
        } = definition;

        let location = match location.as_deref() {
            Some(raw) => raw
                .parse::<ParameterLocation>()
                .map_err(|reason| ParamError::invalid_definition(Some(name.as_str()), reason))?,
            None => {
                return Err(ParamError::invalid_definition(
                    Some(name.as_str()),
                    "missing 'in'",
                ))
            }
        };

        let schema = match schema {
            Some(raw) => {
                if let Some(reference) = find_ref_in_value(&raw) {
                    return Err(ParamError::UnsupportedSchema { reference });
                }
                let parsed: Schema = serde_json::from_value(raw).map_err(|e| {
                    ParamError::invalid_definition(
                        Some(name.as_str()),
                        format!("invalid schema: {}", e),
                    )
                })?;
                Some(parsed)
            }
            None => None,
        };

        let style = match style.as_deref() {
            Some(raw) => raw
                .parse::<ParameterStyle>()
                .map_err(|reason| ParamError::invalid_definition(Some(name.as_str()), reason))?,
            None => ParameterStyle::default_for(location),
        };
        let explode = explode.unwrap_or(style == ParameterStyle::Form);

        debug!(
            parameter = %name,
            location = %location,
            style = %style,
            explode = explode,
            has_schema = schema.is_some(),
            "Parameter spec resolved"
        );

        Ok(ParameterSpec {
            name,
            location,
            style,
            explode,
            required,
            schema,
            config,
        })
    }

    /// Build from an untyped definition, e.g. one entry of an operation's
    /// `parameters` list.
    pub fn from_value(value: &Value) -> Result<Self, ParamError> {
        Self::from_value_with_config(value, ParamConfig::default())
    }

    /// [`ParameterSpec::from_value`] with explicit settings.
    pub fn from_value_with_config(value: &Value, config: ParamConfig) -> Result<Self, ParamError> {
        if let Some(reference) = value.get("$ref").map(|r| match r {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }) {
            return Err(ParamError::UnsupportedSchema { reference });
        }
        let definition: ParameterDefinition =
            serde_json::from_value(value.clone()).map_err(|e| {
                ParamError::invalid_definition(
                    value.get("name").and_then(Value::as_str),
                    e.to_string(),
                )
            })?;
        Self::with_config(definition, config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ParamError> {
        let value: Value = serde_yaml::from_str(yaml)
            .map_err(|e| ParamError::invalid_definition(None, e.to_string()))?;
        Self::from_value(&value)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn location(&self) -> ParameterLocation {
        self.location
    }

    #[must_use]
    pub fn style(&self) -> ParameterStyle {
        self.style
    }

    #[must_use]
    pub fn explode(&self) -> bool {
        self.explode
    }

    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Top-level schema kind; `Other` when there is no schema.
    #[must_use]
    pub fn schema_kind(&self) -> SchemaKind {
        self.schema.as_ref().map_or(SchemaKind::Other, Schema::kind)
    }

    #[must_use]
    pub fn config(&self) -> ParamConfig {
        self.config
    }

    /// Raw textual value of this parameter in `request`, `None` when absent.
    pub fn extract<R: RequestView + ?Sized>(
        &self,
        request: &R,
    ) -> Result<Option<RawValue>, ParamError> {
        extractor::extract(self, request)
    }

    /// Typed value of this parameter in `request`, `None` when absent.
    pub fn value<R: RequestView + ?Sized>(&self, request: &R) -> Result<Option<Value>, ParamError> {
        let converter = Converter::new(self.config);
        self.extract(request)?
            .map(|raw| converter.convert_checked(&raw, self.schema.as_ref()))
            .transpose()
    }
}

impl TryFrom<ParameterDefinition> for ParameterSpec {
    type Error = ParamError;

    fn try_from(definition: ParameterDefinition) -> Result<Self, Self::Error> {
        ParameterSpec::new(definition)
    }
}
