//! Incoming request model: attached site, parsed body, and query parameters.

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::types::{DemandError, DemandResult, Site};

/// Maximum bracket nesting accepted in a query or form key.
pub const MAX_NESTING_LEVEL: usize = 64;

/// The parts of an incoming web request that demand resolution reads.
#[derive(Debug, Clone, Default)]
pub struct ServerRequest {
    site: Option<Arc<Site>>,
    parsed_body: Map<String, Value>,
    query_params: Map<String, Value>,
}

impl ServerRequest {
    /// Create a request with no site, body, or query parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: attach the site the router already matched.
    pub fn with_site(mut self, site: Arc<Site>) -> Self {
        self.site = Some(site);
        self
    }

    pub fn with_parsed_body(mut self, body: Map<String, Value>) -> Self {
        self.parsed_body = body;
        self
    }

    pub fn with_query_params(mut self, params: Map<String, Value>) -> Self {
        self.query_params = params;
        self
    }

    /// Builder: decode a URL query string (with or without a leading `?`).
    pub fn with_query_string(self, query: &str) -> Self {
        let params = parse_query_string(query);
        self.with_query_params(params)
    }

    /// Builder: decode an `application/x-www-form-urlencoded` body.
    pub fn with_form_body(self, body: &str) -> Self {
        let body = parse_query_string(body);
        self.with_parsed_body(body)
    }

    /// Builder: decode a JSON body. The body must be a JSON object.
    pub fn with_json_body(self, body: &str) -> DemandResult<Self> {
        match serde_json::from_str::<Value>(body)? {
            Value::Object(map) => Ok(self.with_parsed_body(map)),
            other => Err(DemandError::InvalidArgument(format!(
                "Request body must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// The site attached to the request, if any.
    pub fn attached_site(&self) -> Option<&Arc<Site>> {
        self.site.as_ref()
    }

    pub fn parsed_body(&self) -> &Map<String, Value> {
        &self.parsed_body
    }

    pub fn query_params(&self) -> &Map<String, Value> {
        &self.query_params
    }
}

/// Decode a URL-encoded query string into a nested mapping.
///
/// Bracketed keys nest: `tx_news[id]=5` becomes `{"tx_news": {"id": "5"}}`,
/// and `tags[]=a&tags[]=b` becomes `{"tags": ["a", "b"]}`. Later pairs
/// overwrite earlier ones. All leaf values are strings. Pairs nested deeper
/// than [`MAX_NESTING_LEVEL`] are dropped.
pub fn parse_query_string(query: &str) -> Map<String, Value> {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut root = Value::Object(Map::new());

    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        if key.is_empty() {
            continue;
        }
        let segments = split_key(&key);
        if segments.len() > MAX_NESTING_LEVEL + 1 {
            tracing::debug!(
                "Dropping argument nested {} levels deep (limit {MAX_NESTING_LEVEL})",
                segments.len() - 1
            );
            continue;
        }
        insert_path(&mut root, &segments, Value::String(value.into_owned()));
    }

    match root {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Split `a[b][]` into `["a", "b", ""]`. Malformed keys stay whole.
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    if open == 0 {
        return vec![key.to_string()];
    }

    let mut segments = vec![key[..open].to_string()];
    let mut rest = &key[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return vec![key.to_string()];
        };
        let Some(close) = inner.find(']') else {
            return vec![key.to_string()];
        };
        segments.push(inner[..close].to_string());
        rest = &inner[close + 1..];
    }
    segments
}

fn insert_path(target: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };

    if head.is_empty() {
        if !target.is_array() {
            *target = Value::Array(Vec::new());
        }
        if let Value::Array(items) = target {
            items.push(Value::Null);
            if let Some(slot) = items.last_mut() {
                insert_path(slot, rest, value);
            }
        }
    } else {
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        if let Value::Object(map) = target {
            let slot = map.entry(head.clone()).or_insert(Value::Null);
            insert_path(slot, rest, value);
        }
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
