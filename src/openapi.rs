//! Bridge from typed [`oas3`] parameter objects.

use crate::error::ParamError;
use crate::spec::{ParameterDefinition, ParameterLocation, ParameterSpec, ParameterStyle};
use oas3::spec::{ObjectOrReference, Parameter};

impl From<oas3::spec::ParameterStyle> for ParameterStyle {
    fn from(style: oas3::spec::ParameterStyle) -> Self {
        use oas3::spec::ParameterStyle as PS;
        match style {
            PS::Matrix => ParameterStyle::Matrix,
            PS::Label => ParameterStyle::Label,
            PS::Form => ParameterStyle::Form,
            PS::Simple => ParameterStyle::Simple,
            PS::SpaceDelimited => ParameterStyle::SpaceDelimited,
            PS::PipeDelimited => ParameterStyle::PipeDelimited,
            PS::DeepObject => ParameterStyle::DeepObject,
        }
    }
}

impl From<oas3::spec::ParameterIn> for ParameterLocation {
    fn from(loc: oas3::spec::ParameterIn) -> Self {
        match loc {
            oas3::spec::ParameterIn::Path => ParameterLocation::Path,
            oas3::spec::ParameterIn::Query => ParameterLocation::Query,
            oas3::spec::ParameterIn::Header => ParameterLocation::Header,
            oas3::spec::ParameterIn::Cookie => ParameterLocation::Cookie,
        }
    }
}

impl TryFrom<&Parameter> for ParameterDefinition {
    type Error = ParamError;

    /// A schema given as a reference is rejected outright.
    fn try_from(param: &Parameter) -> Result<Self, Self::Error> {
        let schema = match param.schema.as_ref() {
            Some(ObjectOrReference::Object(obj)) => Some(serde_json::to_value(obj).map_err(|e| {
                ParamError::invalid_definition(Some(param.name.as_str()), e.to_string())
            })?),
            Some(ObjectOrReference::Ref { ref_path, .. }) => {
                return Err(ParamError::UnsupportedSchema {
                    reference: ref_path.clone(),
                })
            }
            None => None,
        };

        Ok(ParameterDefinition {
            name: param.name.clone(),
            location: Some(ParameterLocation::from(param.location).as_str().to_string()),
            schema,
            style: param
                .style
                .map(ParameterStyle::from)
                .map(|s| s.as_str().to_string()),
            explode: param.explode,
            required: param.required.unwrap_or(false),
            description: param.description.clone(),
        })
    }
}

impl TryFrom<&Parameter> for ParameterSpec {
    type Error = ParamError;

    fn try_from(param: &Parameter) -> Result<Self, Self::Error> {
        ParameterSpec::new(ParameterDefinition::try_from(param)?)
    }
}
