//! Recovers the raw textual value of a parameter from a request.
//!
//! Query parameters branch on the schema's top-level type:
//!
//! | schema            | explode | source                                   |
//! |-------------------|---------|------------------------------------------|
//! | scalar / none     | any     | raw query string, re-parsed              |
//! | `array`           | true    | raw query string, every `name=` part     |
//! | `array`           | false   | parameter map, split on style delimiter  |
//! | `object`          | true    | parameter map, bracketed sub-map         |
//! | `object`          | false   | parameter map, alternating `k,v` pairs   |
//!
//! Header, path and cookie parameters carry a single string serialized with
//! `simple`, `form`, `label` or `matrix` rules.

use crate::error::ParamError;
use crate::runtime_config::OddPairPolicy;
use crate::server::RequestView;
use crate::spec::{
    ParameterLocation, ParameterMap, ParameterSpec, ParameterStyle, RawValue, SchemaKind,
};
use tracing::{debug, warn};

/// Extract the raw value of a parameter from a request.
///
/// # Arguments
///
/// * `spec` - The validated parameter, which fixes location, style and explode
/// * `request` - Any [`RequestView`], usually a [`crate::ParsedRequest`]
///
/// # Returns
///
/// `Ok(None)` when the parameter is absent, otherwise a string, an ordered
/// list of strings or a string map. Fails with `MalformedValue` when the
/// request carries the parameter in a shape its serialization cannot produce.
pub fn extract<R: RequestView + ?Sized>(
    spec: &ParameterSpec,
    request: &R,
) -> Result<Option<RawValue>, ParamError> {
    let raw = match spec.location() {
        ParameterLocation::Query => extract_query(spec, request)?,
        ParameterLocation::Header => extract_single(spec, request.header(spec.name()))?,
        ParameterLocation::Cookie => extract_single(spec, request.cookie(spec.name()))?,
        ParameterLocation::Path => extract_single(spec, request.path_param(spec.name()))?,
    };
    debug!(
        parameter = %spec.name(),
        location = %spec.location(),
        present = raw.is_some(),
        shape = raw.as_ref().map(RawValue::shape),
        "Raw parameter extracted"
    );
    Ok(raw)
}

fn extract_query<R: RequestView + ?Sized>(
    spec: &ParameterSpec,
    request: &R,
) -> Result<Option<RawValue>, ParamError> {
    let name = spec.name();
    match spec.schema_kind() {
        SchemaKind::Array if spec.explode() => {
            Ok(exploded_array(name, request.raw_query_string()).map(RawValue::List))
        }
        SchemaKind::Array => Ok(single_from_map(name, request.parameter_map())?
            .map(|joined| RawValue::from(split_list(joined, spec.style().array_delimiter())))),
        SchemaKind::Object if spec.explode() => exploded_object(spec, request),
        SchemaKind::Object => single_from_map(name, request.parameter_map())?
            .map(|joined| pair_up(spec, split_list(joined, ',')))
            .transpose(),
        _ => Ok(scalar_from_query(name, request.raw_query_string()).map(RawValue::String)),
    }
}

/// Re-parse the raw query string instead of trusting the parsed map, so names
/// and values with `[`, `]` or `,` come back exactly as sent.
fn scalar_from_query(name: &str, query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .filter(|(k, _)| k == name)
        .last()
        .map(|(_, v)| v.into_owned())
}

/// Every `name=value` part, left to right. `name` is compared verbatim, so
/// `tags[]` matches `tags[]=a&tags[]=b` only when configured that way.
fn exploded_array(name: &str, query: &str) -> Option<Vec<RawValue>> {
    let values: Vec<RawValue> = query
        .split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| url::form_urlencoded::parse(part.as_bytes()).next())
        .filter(|(k, _)| k == name)
        .map(|(_, v)| RawValue::String(v.into_owned()))
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn exploded_object<R: RequestView + ?Sized>(
    spec: &ParameterSpec,
    request: &R,
) -> Result<Option<RawValue>, ParamError> {
    let name = spec.name();
    match request.parameter_map().get(name) {
        Some(RawValue::Map(sub)) => Ok(Some(RawValue::Map(sub.clone()))),
        Some(other) => {
            warn!(
                parameter = %name,
                shape = other.shape(),
                "Exploded object parameter is not a bracketed map"
            );
            Err(ParamError::malformed(
                name,
                format!("expected {}[key]=value pairs, got a {}", name, other.shape()),
            ))
        }
        // form + explode serializes an object as its bare properties: R=100&G=200
        None if spec.style() == ParameterStyle::Form => Ok(form_exploded_object(spec, request)),
        None => Ok(None),
    }
}

fn form_exploded_object<R: RequestView + ?Sized>(
    spec: &ParameterSpec,
    request: &R,
) -> Option<RawValue> {
    let properties = spec.schema()?.properties.as_ref()?;
    let query = request.raw_query_string();
    let found: ParameterMap = properties
        .keys()
        .filter_map(|key| scalar_from_query(key, query).map(|v| (key.clone(), RawValue::String(v))))
        .collect();
    if found.is_empty() {
        None
    } else {
        Some(RawValue::Map(found))
    }
}

/// The single joined string for `name` in the parsed parameter map.
fn single_from_map<'a>(
    name: &str,
    params: &'a ParameterMap,
) -> Result<Option<&'a str>, ParamError> {
    match params.get(name) {
        None => Ok(None),
        Some(RawValue::String(s)) => Ok(Some(s.as_str())),
        Some(other) => {
            warn!(
                parameter = %name,
                shape = other.shape(),
                "Expected a single delimited value"
            );
            Err(ParamError::malformed(
                name,
                format!("expected a single delimited value, got a {}", other.shape()),
            ))
        }
    }
}

/// Split a delimited value; an empty string is an empty list.
fn split_list(joined: &str, delimiter: char) -> Vec<String> {
    if joined.is_empty() {
        return Vec::new();
    }
    joined.split(delimiter).map(str::to_string).collect()
}

/// `[k1, v1, k2, v2]` into `{k1: v1, k2: v2}`.
fn pair_up(spec: &ParameterSpec, elements: Vec<String>) -> Result<RawValue, ParamError> {
    if elements.len() % 2 != 0 {
        match spec.config().odd_pairs {
            OddPairPolicy::Reject => {
                warn!(
                    parameter = %spec.name(),
                    element_count = elements.len(),
                    "Odd key/value list rejected"
                );
                return Err(ParamError::malformed(
                    spec.name(),
                    format!(
                        "expected alternating key,value pairs, got {} elements",
                        elements.len()
                    ),
                ));
            }
            OddPairPolicy::DropTrailing => {
                warn!(
                    parameter = %spec.name(),
                    dropped_key = elements.last().map(String::as_str),
                    "Odd key/value list, trailing key dropped"
                );
            }
        }
    }
    let mut map = ParameterMap::new();
    let mut iter = elements.into_iter();
    while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
        map.insert(key, RawValue::String(value));
    }
    Ok(RawValue::Map(map))
}

/// `k1=v1,k2=v2` into `{k1: v1, k2: v2}`; an element without `=` maps to "".
fn key_value_pairs(elements: Vec<String>) -> RawValue {
    RawValue::Map(
        elements
            .into_iter()
            .map(|element| match element.split_once('=') {
                Some((k, v)) => (k.to_string(), RawValue::String(v.to_string())),
                None => (element, RawValue::String(String::new())),
            })
            .collect(),
    )
}

/// Header, cookie and path values: one string framed by the style's prefix.
fn extract_single(
    spec: &ParameterSpec,
    value: Option<&str>,
) -> Result<Option<RawValue>, ParamError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let name = spec.name();
    let style = spec.style();
    let explode = spec.explode();
    // Header list elements may carry optional whitespace: `1, 2`
    let split = |body: &str, delimiter: char| -> Vec<String> {
        let items = split_list(body, delimiter);
        if spec.location() == ParameterLocation::Header {
            items.into_iter().map(|item| item.trim().to_string()).collect()
        } else {
            items
        }
    };

    let raw = match spec.schema_kind() {
        SchemaKind::Array => {
            let (body, delimiter) = unframe(style, explode, name, value);
            let mut items: Vec<String> = split(body, delimiter);
            if style == ParameterStyle::Matrix && explode {
                let prefix = format!("{}=", name);
                items = items
                    .into_iter()
                    .filter(|item| !item.is_empty())
                    .map(|item| item.strip_prefix(&prefix).map(str::to_string).unwrap_or(item))
                    .collect();
            }
            RawValue::List(items.into_iter().map(RawValue::String).collect())
        }
        SchemaKind::Object => {
            let (body, delimiter) = unframe(style, explode, name, value);
            let elements: Vec<String> = split(body, delimiter)
                .into_iter()
                .filter(|e| !(explode && e.is_empty()))
                .collect();
            if explode {
                key_value_pairs(elements)
            } else {
                pair_up(spec, elements)?
            }
        }
        _ => {
            let (body, _) = unframe(style, false, name, value);
            RawValue::String(body.to_string())
        }
    };
    Ok(Some(raw))
}

/// Strip the `label`/`matrix` framing and pick the element delimiter.
fn unframe<'a>(
    style: ParameterStyle,
    explode: bool,
    name: &str,
    value: &'a str,
) -> (&'a str, char) {
    match style {
        ParameterStyle::Label => {
            let body = value.strip_prefix('.').unwrap_or(value);
            (body, if explode { '.' } else { ',' })
        }
        ParameterStyle::Matrix if explode => (value.strip_prefix(';').unwrap_or(value), ';'),
        ParameterStyle::Matrix => {
            let body = value
                .strip_prefix(';')
                .and_then(|v| v.strip_prefix(name))
                .and_then(|v| v.strip_prefix('='))
                .unwrap_or(value);
            (body, ',')
        }
        other => (value, other.array_delimiter()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime_config::ParamConfig;
    use crate::server::ParsedRequest;
    use crate::spec::ParameterDefinition;
    use serde_json::{json, Value};

    fn spec(v: Value) -> ParameterSpec {
        ParameterSpec::from_value(&v).unwrap()
    }

    fn raw(spec: &ParameterSpec, url: &str) -> Option<Value> {
        let req = ParsedRequest::from_url(url);
        extract(spec, &req).unwrap().map(|r| r.to_json())
    }

    #[test]
    fn test_scalar_reads_raw_query() {
        let p = spec(json!({"name": "filter[name]", "in": "query"}));
        assert_eq!(raw(&p, "/pets?filter[name]=abc"), Some(json!("abc")));

        let p = spec(json!({"name": "x[[]abc]", "in": "query", "schema": {"type": "string"}}));
        assert_eq!(raw(&p, "/pets?x[[]abc]=abc"), Some(json!("abc")));

        let p = spec(json!({"name": "q", "in": "query"}));
        assert_eq!(raw(&p, "/pets?q=a%2Cb%5B1%5D"), Some(json!("a,b[1]")));
        assert_eq!(raw(&p, "/pets?other=1"), None);
    }

    #[test]
    fn test_exploded_array_preserves_order() {
        let p = spec(json!({"name": "n", "in": "query", "schema": {"type": "array"}}));
        assert_eq!(raw(&p, "/x?n=c&m=1&n=a&n=b"), Some(json!(["c", "a", "b"])));
        assert_eq!(raw(&p, "/x?m=1"), None);

        let p = spec(json!({"name": "n[]", "in": "query", "schema": {"type": "array"}}));
        assert_eq!(raw(&p, "/x?n[]=1&n%5B%5D=2"), Some(json!(["1", "2"])));
    }

    #[test]
    fn test_delimited_array() {
        for (style, url) in [
            ("form", "/x?n=a,b,c"),
            ("spaceDelimited", "/x?n=a%20b%20c"),
            ("pipeDelimited", "/x?n=a%7Cb%7Cc"),
        ] {
            let p = spec(json!({
                "name": "n", "in": "query", "style": style, "explode": false,
                "schema": {"type": "array"}
            }));
            assert_eq!(raw(&p, url), Some(json!(["a", "b", "c"])), "style {}", style);
        }
    }

    #[test]
    fn test_delimited_array_rejects_structured_entry() {
        let p = spec(json!({
            "name": "n", "in": "query", "explode": false, "schema": {"type": "array"}
        }));
        let req = ParsedRequest::from_url("/x?n[a]=1");
        assert_eq!(extract(&p, &req).unwrap_err().kind(), "malformed_value");
    }

    #[test]
    fn test_deep_object() {
        let p = spec(json!({
            "name": "color", "in": "query", "style": "deepObject", "explode": true,
            "schema": {"type": "object"}
        }));
        assert_eq!(
            raw(&p, "/x?color[R]=100&color[G]=200"),
            Some(json!({"R": "100", "G": "200"}))
        );
        assert_eq!(raw(&p, "/x?other[R]=1"), None);

        let req = ParsedRequest::from_url("/x?color=red");
        assert_eq!(extract(&p, &req).unwrap_err().kind(), "malformed_value");
    }

    #[test]
    fn test_form_exploded_object_reads_bare_properties() {
        let p = spec(json!({
            "name": "color", "in": "query",
            "schema": {"type": "object", "properties": {"R": {}, "G": {}}}
        }));
        assert_eq!(raw(&p, "/x?R=1&G=2&B=3"), Some(json!({"R": "1", "G": "2"})));
        assert_eq!(raw(&p, "/x?color[R]=9"), Some(json!({"R": "9"})));
    }

    #[test]
    fn test_paired_object() {
        let p = spec(json!({
            "name": "color", "in": "query", "explode": false, "schema": {"type": "object"}
        }));
        assert_eq!(
            raw(&p, "/x?color=R,100,G,200"),
            Some(json!({"R": "100", "G": "200"}))
        );
        assert_eq!(raw(&p, "/x?color="), Some(json!({})));
    }

    #[test]
    fn test_odd_pairs_policy() {
        let definition: ParameterDefinition = serde_json::from_value(json!({
            "name": "color", "in": "query", "explode": false, "schema": {"type": "object"}
        }))
        .unwrap();
        let req = ParsedRequest::from_url("/x?color=R,100,G");

        let strict = ParameterSpec::new(definition.clone()).unwrap();
        assert_eq!(extract(&strict, &req).unwrap_err().kind(), "malformed_value");

        let lenient = ParameterSpec::with_config(
            definition,
            ParamConfig {
                odd_pairs: OddPairPolicy::DropTrailing,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(
            extract(&lenient, &req).unwrap().map(|r| r.to_json()),
            Some(json!({"R": "100"}))
        );
    }

    #[test]
    fn test_header_and_cookie_simple_style() {
        let req = ParsedRequest::from_url("/x")
            .with_header("X-Ids", "1,2,3")
            .with_header("X-Color", "R=1,G=2")
            .with_header("Cookie", "id=5");

        let p = spec(json!({"name": "x-ids", "in": "header", "schema": {"type": "array"}}));
        assert_eq!(
            extract(&p, &req).unwrap().map(|r| r.to_json()),
            Some(json!(["1", "2", "3"]))
        );

        let p = spec(json!({
            "name": "X-Color", "in": "header", "explode": true, "schema": {"type": "object"}
        }));
        assert_eq!(
            extract(&p, &req).unwrap().map(|r| r.to_json()),
            Some(json!({"R": "1", "G": "2"}))
        );

        let p = spec(json!({"name": "id", "in": "cookie"}));
        assert_eq!(extract(&p, &req).unwrap().map(|r| r.to_json()), Some(json!("5")));

        let p = spec(json!({"name": "missing", "in": "header"}));
        assert_eq!(extract(&p, &req).unwrap(), None);
    }

    #[test]
    fn test_header_list_elements_are_trimmed() {
        let req = ParsedRequest::from_url("/x")
            .with_header("X-Ids", "1, 2 ,3")
            .with_header("X-Color", "R=1, G=2");

        let p = spec(json!({"name": "x-ids", "in": "header", "schema": {"type": "array"}}));
        assert_eq!(
            extract(&p, &req).unwrap().map(|r| r.to_json()),
            Some(json!(["1", "2", "3"]))
        );

        let p = spec(json!({
            "name": "x-color", "in": "header", "explode": true, "schema": {"type": "object"}
        }));
        assert_eq!(
            extract(&p, &req).unwrap().map(|r| r.to_json()),
            Some(json!({"R": "1", "G": "2"}))
        );
    }

    #[test]
    fn test_path_label_and_matrix() {
        let req = ParsedRequest::from_url("/x")
            .with_path_param("a", ".3.4.5")
            .with_path_param("b", ";b=3,4,5")
            .with_path_param("c", ";c=3;c=4;c=5")
            .with_path_param("d", ";d=7");

        let path_array = |name: &str, style: &str, explode: bool| {
            json!({
                "name": name, "in": "path", "style": style, "explode": explode,
                "schema": {"type": "array"}
            })
        };
        let cases = [
            (path_array("a", "label", true), json!(["3", "4", "5"])),
            (path_array("b", "matrix", false), json!(["3", "4", "5"])),
            (path_array("c", "matrix", true), json!(["3", "4", "5"])),
            (json!({"name": "d", "in": "path", "style": "matrix"}), json!("7")),
        ];
        for (definition, expected) in cases {
            let p = spec(definition);
            assert_eq!(
                extract(&p, &req).unwrap().map(|r| r.to_json()),
                Some(expected),
                "parameter {}",
                p.name()
            );
        }
    }
}
