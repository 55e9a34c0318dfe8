//! # oas_param
//!
//! Extracts a single request parameter (query, path, header or cookie) and converts it
//! to typed JSON according to its [OpenAPI 3.1](https://spec.openapis.org/oas/v3.1.0)
//! parameter definition.
//!
//! ## Overview
//!
//! Reading a parameter happens in two stages:
//!
//! 1. **Extraction** ([`extractor`]) recovers the raw text from the request, following the
//!    parameter's `style` and `explode` rules: a single string, an ordered list of strings,
//!    or a string map.
//! 2. **Conversion** ([`converter`]) walks the schema and turns that raw value into integers,
//!    floats, booleans, nested objects and arrays (including `prefixItems`).
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller
//!     participant Spec as ParameterSpec
//!     participant Extractor as extractor
//!     participant Converter as converter
//!
//!     Caller->>Spec: ParameterSpec::from_value(definition)
//!     Spec->>Spec: check `in`, `style`, scan schema for $ref
//!     Caller->>Spec: value(&request)
//!     Spec->>Extractor: extract(spec, request)
//!     Extractor-->>Spec: Option<RawValue>
//!     Spec->>Converter: convert(raw, schema)
//!     Converter-->>Caller: Option<serde_json::Value>
//! ```
//!
//! ## Modules
//!
//! - **[`spec`]** - parameter definitions, schemas and the validated [`ParameterSpec`]
//! - **[`server`]** - the [`RequestView`] seam and the [`ParsedRequest`] implementation
//! - **[`extractor`]** - raw value recovery per location, style and explode flag
//! - **[`converter`]** - schema-driven type conversion
//! - **[`openapi`]** - conversion from typed `oas3` parameter objects
//! - **[`runtime_config`]** - environment-driven policy knobs
//! - **[`logging`]** - optional `tracing-subscriber` setup
//!
//! ## Quick Start
//!
//! ```
//! use oas_param::{ParameterSpec, ParsedRequest};
//! use serde_json::json;
//!
//! let spec = ParameterSpec::from_value(&json!({
//!     "name": "color",
//!     "in": "query",
//!     "style": "deepObject",
//!     "explode": true,
//!     "schema": {
//!         "type": "object",
//!         "properties": {
//!             "R": { "type": "integer" },
//!             "G": { "type": "integer" },
//!             "B": { "type": "integer" }
//!         }
//!     }
//! }))
//! .unwrap();
//!
//! let request = ParsedRequest::from_url("/pets?color[R]=100&color[G]=200&color[B]=150");
//! assert_eq!(
//!     spec.value(&request).unwrap(),
//!     Some(json!({ "R": 100, "G": 200, "B": 150 }))
//! );
//! ```
//!
//! ## Limitations
//!
//! Schemas containing `$ref` are rejected when the [`ParameterSpec`] is built; references
//! are never resolved. Resolve them before handing the definition over.
//!
//! Boolean conversion is permissive: `"true"` is `true` and every other string is `false`.
//! Set `OAS_PARAM_STRICT_BOOLEANS=true` (see [`runtime_config`]) to reject anything else.

pub mod converter;
pub mod error;
pub mod extractor;
pub mod logging;
pub mod openapi;
pub mod runtime_config;
pub mod server;
pub mod spec;

pub use converter::{convert, Converter};
pub use error::ParamError;
pub use runtime_config::{OddPairPolicy, ParamConfig};
pub use server::{ParsedRequest, RequestView};
pub use spec::{
    ParameterDefinition, ParameterLocation, ParameterMap, ParameterSpec, ParameterStyle,
    RawValue, Schema, SchemaKind, SubSchema,
};
