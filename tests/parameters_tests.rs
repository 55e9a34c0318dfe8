#![allow(clippy::unwrap_used, clippy::expect_used)]

use oas_param::{ParamError, ParameterLocation, ParameterSpec, ParsedRequest};
use serde_json::{json, Value};

fn value_of(definition: Value, url: &str) -> Result<Option<Value>, ParamError> {
    let spec = ParameterSpec::from_value(&definition).expect("valid definition");
    spec.value(&ParsedRequest::from_url(url))
}

#[test]
fn test_integer_query_parameter() {
    let v = value_of(
        json!({"in": "query", "name": "id", "schema": {"type": "integer"}}),
        "/pets?id=12",
    )
    .unwrap();
    assert_eq!(v, Some(json!(12)));
}

#[test]
fn test_no_schema_returns_string() {
    let v = value_of(json!({"in": "query", "name": "id"}), "/pets?id=abc").unwrap();
    assert_eq!(v, Some(json!("abc")));

    let v = value_of(json!({"in": "query", "name": "id", "schema": {}}), "/pets?id=abc").unwrap();
    assert_eq!(v, Some(json!("abc")));
}

#[test]
fn test_absent_parameter_is_none() {
    for schema in [
        json!({"type": "integer"}),
        json!({"type": "array", "items": {"type": "integer"}}),
        json!({"type": "object", "properties": {"R": {"type": "integer"}}}),
    ] {
        let v = value_of(
            json!({"in": "query", "name": "missing", "schema": schema}),
            "/pets?id=1",
        )
        .unwrap();
        assert_eq!(v, None, "schema {}", schema);
    }
}

#[test]
fn test_number_scientific_notation() {
    let v = value_of(
        json!({"in": "query", "name": "id", "schema": {"type": "number"}}),
        "/pets?id=2.99792458e8",
    )
    .unwrap();
    assert_eq!(v, Some(json!(299792458.0)));
}

#[test]
fn test_integer_conversion_error() {
    let err = value_of(
        json!({"in": "query", "name": "id", "schema": {"type": "integer"}}),
        "/pets?id=1.5",
    )
    .unwrap_err();
    assert_eq!(
        err,
        ParamError::ConversionError {
            expected: "integer",
            value: "1.5".to_string()
        }
    );
}

#[test]
fn test_form_array_not_exploded() {
    let v = value_of(
        json!({
            "in": "query", "name": "name", "style": "form", "explode": false,
            "schema": {"type": "array", "items": {"type": "string"}}
        }),
        "/pets?name=a,b,c",
    )
    .unwrap();
    assert_eq!(v, Some(json!(["a", "b", "c"])));
}

#[test]
fn test_exploded_array_default() {
    let v = value_of(
        json!({
            "in": "query", "name": "id",
            "schema": {"type": "array", "items": {"type": "integer"}}
        }),
        "/pets?id=3&id=1&id=2",
    )
    .unwrap();
    assert_eq!(v, Some(json!([3, 1, 2])));
}

#[test]
fn test_deep_object() {
    let v = value_of(
        json!({
            "in": "query", "name": "color", "style": "deepObject", "explode": true,
            "schema": {
                "type": "object",
                "properties": {
                    "R": {"type": "integer"},
                    "G": {"type": "integer"},
                    "B": {"type": "integer"}
                }
            }
        }),
        "/pets?color[R]=100&color[G]=200&color[B]=150",
    )
    .unwrap();
    assert_eq!(v, Some(json!({"R": 100, "G": 200, "B": 150})));
}

#[test]
fn test_deep_object_unknown_key() {
    let err = value_of(
        json!({
            "in": "query", "name": "color", "style": "deepObject", "explode": true,
            "schema": {"type": "object", "properties": {"R": {"type": "integer"}}}
        }),
        "/pets?color[R]=100&color[A]=1",
    )
    .unwrap_err();
    assert_eq!(err.kind(), "schema_mismatch");
}

#[test]
fn test_object_not_exploded() {
    let v = value_of(
        json!({
            "in": "query", "name": "color", "style": "form", "explode": false,
            "schema": {
                "type": "object",
                "properties": {
                    "R": {"type": "integer"},
                    "G": {"type": "integer"},
                    "B": {"type": "integer"}
                }
            }
        }),
        "/pets?color=R,100,G,200,B,150",
    )
    .unwrap();
    assert_eq!(v, Some(json!({"R": 100, "G": 200, "B": 150})));
}

#[test]
fn test_object_not_exploded_odd_elements() {
    let err = value_of(
        json!({
            "in": "query", "name": "color", "explode": false,
            "schema": {"type": "object", "properties": {"R": {"type": "integer"}}}
        }),
        "/pets?color=R,100,G",
    )
    .unwrap_err();
    assert_eq!(err.kind(), "malformed_value");
}

#[test]
fn test_nested_ref_rejected_at_construction() {
    let err = ParameterSpec::from_value(&json!({
        "in": "query", "name": "filter",
        "schema": {"type": "object", "properties": {"meta": {"$ref": "#/x"}}}
    }))
    .unwrap_err();
    assert_eq!(
        err,
        ParamError::UnsupportedSchema {
            reference: "#/x".to_string()
        }
    );
}

#[test]
fn test_header_parameter() {
    let spec = ParameterSpec::from_value(&json!({
        "in": "header", "name": "X-Rate",
        "schema": {"type": "array", "items": {"type": "number"}}
    }))
    .unwrap();
    assert_eq!(spec.location(), ParameterLocation::Header);
    let req = ParsedRequest::from_url("/pets").with_header("x-rate", "1.5,2");
    assert_eq!(spec.value(&req).unwrap(), Some(json!([1.5, 2.0])));
}

#[test]
fn test_path_parameter() {
    let spec = ParameterSpec::from_value(&json!({
        "in": "path", "name": "id", "required": true, "schema": {"type": "integer"}
    }))
    .unwrap();
    let req = ParsedRequest::from_url("/pets/42").with_path_param("id", "42");
    assert_eq!(spec.value(&req).unwrap(), Some(json!(42)));
}

#[test]
fn test_cookie_parameter_from_http_request() {
    let spec = ParameterSpec::from_value(&json!({
        "in": "cookie", "name": "debug", "schema": {"type": "boolean"}
    }))
    .unwrap();
    let req = http::Request::builder()
        .uri("/pets")
        .header("Cookie", "debug=true; theme=dark")
        .body(())
        .unwrap();
    let parsed = ParsedRequest::from_http(&req);
    assert_eq!(spec.value(&parsed).unwrap(), Some(json!(true)));
}

#[test]
fn test_spec_is_shareable_across_threads() {
    let spec = std::sync::Arc::new(
        ParameterSpec::from_value(&json!({
            "in": "query", "name": "id", "schema": {"type": "integer"}
        }))
        .unwrap(),
    );
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let spec = std::sync::Arc::clone(&spec);
            std::thread::spawn(move || {
                let req = ParsedRequest::from_url(&format!("/pets?id={}", i));
                spec.value(&req).unwrap()
            })
        })
        .collect();
    let values: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(
        values,
        vec![Some(json!(0)), Some(json!(1)), Some(json!(2)), Some(json!(3))]
    );
}

#[test]
fn test_deeply_nested_brackets_do_not_disturb_other_parameters() {
    let url = format!("/pets?id=1&x{}=1", "[a]".repeat(10_000));
    let v = value_of(
        json!({"in": "query", "name": "id", "schema": {"type": "integer"}}),
        &url,
    )
    .unwrap();
    assert_eq!(v, Some(json!(1)));

    let v = value_of(
        json!({
            "in": "query", "name": "x", "style": "deepObject", "explode": true,
            "schema": {"type": "object"}
        }),
        &url,
    )
    .unwrap();
    assert_eq!(v, None);
}

#[test]
fn test_closed_tuple_with_boolean_items() {
    let spec = ParameterSpec::from_value(&json!({
        "in": "query", "name": "p", "explode": false,
        "schema": {"type": "array", "prefixItems": [{"type": "integer"}], "items": false}
    }))
    .unwrap();
    assert_eq!(
        spec.value(&ParsedRequest::from_url("/pets?p=7")).unwrap(),
        Some(json!([7]))
    );
    let err = spec.value(&ParsedRequest::from_url("/pets?p=7,8")).unwrap_err();
    assert_eq!(err.kind(), "malformed_value");

    let spec = ParameterSpec::from_value(&json!({
        "in": "query", "name": "f", "style": "deepObject", "explode": true,
        "schema": {"type": "object", "properties": {"a": true}}
    }))
    .unwrap();
    assert_eq!(
        spec.value(&ParsedRequest::from_url("/pets?f[a]=x")).unwrap(),
        Some(json!({"a": "x"}))
    );
}
