use super::core::RequestView;
use crate::spec::{ParameterMap, RawValue};
use std::collections::HashMap;
use tracing::debug;

/// Parsed HTTP request data used by the extractor.
///
/// Holds the raw query string next to its bracket-aware parsed form, so the
/// extractor can pick whichever the parameter's serialization needs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedRequest {
    /// Request path without the query string
    pub path: String,
    /// Undecoded query string, without the leading `?`
    pub query: String,
    /// HTTP headers (lowercase keys)
    pub headers: HashMap<String, String>,
    /// Parsed cookies from Cookie header
    pub cookies: HashMap<String, String>,
    /// Path parameters captured by the router
    pub path_params: HashMap<String, String>,
    params: ParameterMap,
}

impl ParsedRequest {
    /// Build from a path with an optional query, e.g. `/pets?id=12`.
    ///
    /// Absolute URLs are accepted too; scheme and authority are ignored.
    pub fn from_url(url: &str) -> Self {
        let without_fragment = url.split('#').next().unwrap_or("");
        let without_fragment = match without_fragment.split_once("://") {
            Some((_, rest)) => rest.find(['/', '?']).map_or("", |pos| &rest[pos..]),
            None => without_fragment,
        };
        let (path, query) = match without_fragment.split_once('?') {
            Some((path, query)) => (path, query),
            None => (without_fragment, ""),
        };
        let params = parse_parameter_map(query);
        debug!(
            path = %path,
            param_count = params.len(),
            "Query params parsed"
        );
        ParsedRequest {
            path: path.to_string(),
            query: query.to_string(),
            params,
            ..Default::default()
        }
    }

    /// Build from an `http::Request`, taking the URI, headers and cookies.
    ///
    /// Repeated header fields are combined into one value, joined with `, `
    /// (or `; ` for `cookie`), so no field line is lost.
    pub fn from_http<B>(req: &http::Request<B>) -> Self {
        let uri = req.uri();
        let query = uri.query().unwrap_or("");
        let headers: HashMap<String, String> = req
            .headers()
            .keys()
            .map(|name| {
                let separator = if *name == http::header::COOKIE { "; " } else { ", " };
                let combined = req
                    .headers()
                    .get_all(name)
                    .iter()
                    .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
                    .collect::<Vec<_>>()
                    .join(separator);
                (name.as_str().to_string(), combined)
            })
            .collect();
        let cookies = parse_cookies(&headers);
        debug!(
            header_count = headers.len(),
            cookie_count = cookies.len(),
            "Headers extracted"
        );
        ParsedRequest {
            path: uri.path().to_string(),
            query: query.to_string(),
            headers,
            cookies,
            path_params: HashMap::new(),
            params: parse_parameter_map(query),
        }
    }

    /// Add a header; a `cookie` header also refreshes the parsed cookies.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        let is_cookie = name == "cookie";
        self.headers.insert(name, value.to_string());
        if is_cookie {
            self.cookies.extend(parse_cookies(&self.headers));
        }
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }

    #[must_use]
    pub fn with_path_param(mut self, name: &str, value: &str) -> Self {
        self.path_params.insert(name.to_string(), value.to_string());
        self
    }
}

impl RequestView for ParsedRequest {
    fn raw_query_string(&self) -> &str {
        &self.query
    }

    fn parameter_map(&self) -> &ParameterMap {
        &self.params
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }
}

/// Parse the `cookie` header into name/value pairs.
pub fn parse_cookies(headers: &HashMap<String, String>) -> HashMap<String, String> {
    headers
        .get("cookie")
        .map(|c| {
            c.split(';')
                .filter_map(|pair| {
                    let mut parts = pair.trim().splitn(2, '=');
                    let name = parts.next()?.trim().to_string();
                    if name.is_empty() {
                        return None;
                    }
                    let value = parts.next().unwrap_or("").trim().to_string();
                    Some((name, value))
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Parse a query string into a nested parameter map.
///
/// Keys use bracket notation the way form frameworks do:
/// - `a=1` sets `a` to `"1"` (a repeated plain key keeps the last value)
/// - `a[]=1&a[]=2` collects `["1", "2"]` under `a`
/// - `a[b]=1&a[c]=2` groups `{b: "1", c: "2"}` under `a`, nesting as deep as the brackets go
///
/// Keys whose brackets do not close cleanly, or that nest deeper than
/// [`MAX_BRACKET_DEPTH`], are stored verbatim.
pub fn parse_parameter_map(query: &str) -> ParameterMap {
    let mut map = ParameterMap::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        match split_bracket_key(&key) {
            Some((base, segments)) => insert_nested(&mut map, base, &segments, value.into_owned()),
            None => {
                map.insert(key.to_string(), RawValue::String(value.into_owned()));
            }
        }
    }
    map
}

/// Deepest bracket nesting expanded by [`parse_parameter_map`].
pub const MAX_BRACKET_DEPTH: usize = 32;

/// `a[b][]` becomes `("a", ["b", ""])`; `None` for plain, malformed or too deep keys.
fn split_bracket_key(key: &str) -> Option<(&str, Vec<&str>)> {
    let open = key.find('[')?;
    if open == 0 {
        return None;
    }
    let base = &key[..open];
    let mut rest = &key[open..];
    let mut segments = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        let segment = &inner[..close];
        if segment.contains('[') || segments.len() == MAX_BRACKET_DEPTH {
            return None;
        }
        segments.push(segment);
        rest = &inner[close + 1..];
    }
    Some((base, segments))
}

fn insert_nested(map: &mut ParameterMap, key: &str, segments: &[&str], value: String) {
    let Some((first, rest)) = segments.split_first() else {
        map.insert(key.to_string(), RawValue::String(value));
        return;
    };

    if first.is_empty() {
        let entry = map
            .entry(key.to_string())
            .or_insert_with(|| RawValue::List(Vec::new()));
        if !matches!(entry, RawValue::List(_)) {
            *entry = RawValue::List(Vec::new());
        }
        if let RawValue::List(items) = entry {
            push_list_item(items, rest, value);
        }
        return;
    }

    let entry = map
        .entry(key.to_string())
        .or_insert_with(|| RawValue::Map(ParameterMap::new()));
    if !matches!(entry, RawValue::Map(_)) {
        *entry = RawValue::Map(ParameterMap::new());
    }
    if let RawValue::Map(inner) = entry {
        insert_nested(inner, first, rest, value);
    }
}

/// `a[][x]=1&a[][y]=2` fills one element until a key repeats, then starts the next.
fn push_list_item(items: &mut Vec<RawValue>, segments: &[&str], value: String) {
    let Some((first, rest)) = segments.split_first() else {
        items.push(RawValue::String(value));
        return;
    };
    if let Some(RawValue::Map(last)) = items.last_mut() {
        if !first.is_empty() && !last.contains_key(*first) {
            insert_nested(last, first, rest, value);
            return;
        }
    }
    let mut fresh = ParameterMap::new();
    insert_nested(&mut fresh, first, rest, value);
    items.push(RawValue::Map(fresh));
}
