use std::fmt;

/// Error raised while building a [`crate::spec::ParameterSpec`] or reading its value.
///
/// `InvalidDefinition` and `UnsupportedSchema` are construction-time failures and
/// mean the parameter definition itself has to be fixed. The remaining variants
/// are raised by `value()` and describe bad input on a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    /// The definition is unusable: `in` missing or unknown, unknown `style`, or
    /// the definition could not be deserialized at all.
    InvalidDefinition {
        /// Parameter name, when it could be read
        name: Option<String>,
        /// What is wrong with the definition
        reason: String,
    },
    /// The schema contains a `$ref`. References are rejected, never resolved.
    UnsupportedSchema {
        /// The offending reference target
        reference: String,
    },
    /// Raw text could not be parsed as the declared scalar type.
    ConversionError {
        /// Declared schema type (`integer`, `number`, `boolean`)
        expected: &'static str,
        /// The raw text that failed to parse
        value: String,
    },
    /// An object key has no matching entry in the schema's `properties`.
    SchemaMismatch {
        /// The unexpected key
        key: String,
    },
    /// The raw value has the wrong structure for the declared shape.
    MalformedValue {
        /// Parameter name or object key the value belongs to
        name: String,
        /// What is wrong with the value
        reason: String,
    },
}

impl ParamError {
    pub(crate) fn invalid_definition(name: Option<&str>, reason: impl Into<String>) -> Self {
        ParamError::InvalidDefinition {
            name: name.map(str::to_string),
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ParamError::MalformedValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case label, suitable for log fields and problem responses.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            ParamError::InvalidDefinition { .. } => "invalid_definition",
            ParamError::UnsupportedSchema { .. } => "unsupported_schema",
            ParamError::ConversionError { .. } => "conversion_error",
            ParamError::SchemaMismatch { .. } => "schema_mismatch",
            ParamError::MalformedValue { .. } => "malformed_value",
        }
    }
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamError::InvalidDefinition {
                name: Some(name),
                reason,
            } => write!(f, "invalid parameter definition '{}': {}", name, reason),
            ParamError::InvalidDefinition { name: None, reason } => {
                write!(f, "invalid parameter definition: {}", reason)
            }
            ParamError::UnsupportedSchema { reference } => write!(
                f,
                "unsupported schema: $ref '{}' is not supported in parameter schemas",
                reference
            ),
            ParamError::ConversionError { expected, value } => {
                write!(f, "cannot convert '{}' to {}", value, expected)
            }
            ParamError::SchemaMismatch { key } => {
                write!(f, "key '{}' is not declared in the schema properties", key)
            }
            ParamError::MalformedValue { name, reason } => {
                write!(f, "malformed value for '{}': {}", name, reason)
            }
        }
    }
}

impl std::error::Error for ParamError {}
