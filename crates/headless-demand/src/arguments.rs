//! Action argument lookup across the parsed body and query parameters.
//!
//! An argument is read from an ordered chain of [`ArgumentSource`]s; the
//! first source holding a non-null value wins.

use serde_json::Value;

use crate::request::{json_kind, ServerRequest};

/// One place an action argument can be read from.
pub trait ArgumentSource: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &'static str;

    /// Raw value for `argument`, if the source holds the key.
    fn lookup<'r>(&self, request: &'r ServerRequest, argument: &str) -> Option<&'r Value>;
}

/// `parsedBody[argument]`
pub struct ParsedBodySource;

/// `queryParams[argument]`
pub struct QueryParamSource;

/// `queryParams[namespace][argument]`
pub struct NamespacedQuerySource {
    namespace: String,
}

impl NamespacedQuerySource {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl ArgumentSource for ParsedBodySource {
    fn name(&self) -> &'static str {
        "parsed_body"
    }

    fn lookup<'r>(&self, request: &'r ServerRequest, argument: &str) -> Option<&'r Value> {
        request.parsed_body().get(argument)
    }
}

impl ArgumentSource for QueryParamSource {
    fn name(&self) -> &'static str {
        "query"
    }

    fn lookup<'r>(&self, request: &'r ServerRequest, argument: &str) -> Option<&'r Value> {
        request.query_params().get(argument)
    }
}

impl ArgumentSource for NamespacedQuerySource {
    fn name(&self) -> &'static str {
        "namespaced_query"
    }

    fn lookup<'r>(&self, request: &'r ServerRequest, argument: &str) -> Option<&'r Value> {
        request
            .query_params()
            .get(&self.namespace)?
            .as_object()?
            .get(argument)
    }
}

/// Typed access to the action arguments of one request.
pub struct ActionArguments<'r> {
    request: &'r ServerRequest,
    sources: Vec<Box<dyn ArgumentSource>>,
}

impl<'r> ActionArguments<'r> {
    /// The standard chain: parsed body, then query, then namespaced query.
    pub fn new(request: &'r ServerRequest, plugin_namespace: &str) -> Self {
        Self::with_sources(
            request,
            vec![
                Box::new(ParsedBodySource),
                Box::new(QueryParamSource),
                Box::new(NamespacedQuerySource::new(plugin_namespace)),
            ],
        )
    }

    /// A custom chain, tried in the given order.
    pub fn with_sources(request: &'r ServerRequest, sources: Vec<Box<dyn ArgumentSource>>) -> Self {
        Self { request, sources }
    }

    /// First non-null value for `name` across the chain.
    pub fn get(&self, name: &str) -> Option<&'r Value> {
        for source in &self.sources {
            match source.lookup(self.request, name) {
                Some(Value::Null) | None => continue,
                Some(value) => {
                    tracing::trace!("Argument '{name}' read from {}", source.name());
                    return Some(value);
                }
            }
        }
        None
    }

    /// Integer argument, or `default` when absent or not castable.
    pub fn integer(&self, name: &str, default: i64) -> i64 {
        self.cast(name, default, cast_integer)
    }

    /// Boolean argument, or `default` when absent or not castable.
    pub fn boolean(&self, name: &str, default: bool) -> bool {
        self.cast(name, default, cast_bool)
    }

    /// String argument, or `default` when absent or not castable.
    pub fn string(&self, name: &str, default: &str) -> String {
        self.cast(name, default.to_string(), cast_string)
    }

    fn cast<T>(&self, name: &str, default: T, cast: fn(&Value) -> Option<T>) -> T {
        let Some(value) = self.get(name) else {
            return default;
        };
        match cast(value) {
            Some(v) => v,
            None => {
                tracing::warn!(
                    "Argument '{name}' is a {}, which cannot be cast; using default",
                    json_kind(value)
                );
                default
            }
        }
    }
}

/// Cast a scalar to an integer. Arrays, objects and null yield `None`.
pub fn cast_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|u| i64::try_from(u).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => Some(parse_integer(s)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Cast a scalar to a boolean. Arrays, objects and null yield `None`.
pub fn cast_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Some(!(s.is_empty() || s == "0")),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Cast a scalar to a string. Arrays, objects and null yield `None`.
pub fn cast_string(value: &Value) -> Option<String> {
    match value {
        Value::Bool(true) => Some("1".to_string()),
        Value::Bool(false) => Some(String::new()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Leading numeric prefix of `s` as an integer: `"12abc"` is 12, `"1e3"` is
/// 1000, `"3.9"` is 3. Text without a numeric prefix is 0.
fn parse_integer(s: &str) -> i64 {
    let s = s.trim_start_matches([' ', '\t', '\n', '\r', '\x0b', '\x0c']);
    let bytes = s.as_bytes();
    let is_digit = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while is_digit(end) {
        end += 1;
    }
    let mut digits = end - int_start;
    let mut fractional = false;

    if bytes.get(end) == Some(&b'.') {
        let mut frac_end = end + 1;
        while is_digit(frac_end) {
            frac_end += 1;
        }
        let frac_digits = frac_end - end - 1;
        if digits > 0 || frac_digits > 0 {
            digits += frac_digits;
            end = frac_end;
            fractional = true;
        }
    }
    if digits == 0 {
        return 0;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_start = exp_end;
        while is_digit(exp_end) {
            exp_end += 1;
        }
        if exp_end > exp_start {
            end = exp_end;
            fractional = true;
        }
    }

    let number = &s[..end];
    if !fractional {
        if let Ok(i) = number.parse::<i64>() {
            return i;
        }
    }
    match number.parse::<f64>() {
        Ok(f) if f.is_finite() => f as i64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_precedence_body_query_namespace() {
        let request = ServerRequest::new()
            .with_parsed_body(object(json!({"id": 1})))
            .with_query_params(object(json!({"id": 2, "tx_ns": {"id": 3}})));
        let args = ActionArguments::new(&request, "tx_ns");
        assert_eq!(args.integer("id", 0), 1);

        let request = ServerRequest::new()
            .with_query_params(object(json!({"id": 2, "tx_ns": {"id": 3}})));
        let args = ActionArguments::new(&request, "tx_ns");
        assert_eq!(args.integer("id", 0), 2);

        let request = ServerRequest::new().with_query_params(object(json!({"tx_ns": {"id": 3}})));
        let args = ActionArguments::new(&request, "tx_ns");
        assert_eq!(args.integer("id", 0), 3);
    }

    #[test]
    fn test_null_falls_through() {
        let request = ServerRequest::new()
            .with_parsed_body(object(json!({"lang": null})))
            .with_query_params(object(json!({"lang": null, "ns": {"lang": "4"}})));
        let args = ActionArguments::new(&request, "ns");
        assert_eq!(args.integer("lang", 0), 4);
        assert!(args.get("missing").is_none());
    }

    #[test]
    fn test_namespace_must_be_mapping() {
        let request = ServerRequest::new().with_query_params(object(json!({"ns": "flat"})));
        let args = ActionArguments::new(&request, "ns");
        assert!(args.get("id").is_none());
    }

    #[test]
    fn test_empty_namespace_is_a_plain_key() {
        let request = ServerRequest::new().with_query_params(object(json!({"": {"id": 9}})));
        let args = ActionArguments::new(&request, "");
        assert_eq!(args.integer("id", 0), 9);
    }

    #[test]
    fn test_custom_chain_order() {
        let request = ServerRequest::new()
            .with_parsed_body(object(json!({"id": 1})))
            .with_query_params(object(json!({"id": 2})));
        let args = ActionArguments::with_sources(
            &request,
            vec![Box::new(QueryParamSource), Box::new(ParsedBodySource)],
        );
        assert_eq!(args.integer("id", 0), 2);
    }

    #[test]
    fn test_integer_casts() {
        assert_eq!(cast_integer(&json!(7)), Some(7));
        assert_eq!(cast_integer(&json!(7.9)), Some(7));
        assert_eq!(cast_integer(&json!(true)), Some(1));
        assert_eq!(cast_integer(&json!(" 12 ")), Some(12));
        assert_eq!(cast_integer(&json!("3.5")), Some(3));
        assert_eq!(cast_integer(&json!("abc")), Some(0));
        assert_eq!(cast_integer(&json!("12abc")), Some(12));
        assert_eq!(cast_integer(&json!("-7 items")), Some(-7));
        assert_eq!(cast_integer(&json!("1e3")), Some(1000));
        assert_eq!(cast_integer(&json!("2.5e1x")), Some(25));
        assert_eq!(cast_integer(&json!("4e")), Some(4));
        assert_eq!(cast_integer(&json!(".9")), Some(0));
        assert_eq!(cast_integer(&json!("-")), Some(0));
        assert_eq!(cast_integer(&json!("99999999999999999999")), Some(i64::MAX));
        assert_eq!(cast_integer(&json!([1])), None);
    }

    #[test]
    fn test_bool_casts() {
        assert_eq!(cast_bool(&json!(false)), Some(false));
        assert_eq!(cast_bool(&json!(0)), Some(false));
        assert_eq!(cast_bool(&json!(2)), Some(true));
        assert_eq!(cast_bool(&json!("")), Some(false));
        assert_eq!(cast_bool(&json!("0")), Some(false));
        assert_eq!(cast_bool(&json!("false")), Some(true));
        assert_eq!(cast_bool(&json!(" 0")), Some(true));
        assert_eq!(cast_bool(&json!("1")), Some(true));
        assert_eq!(cast_bool(&json!({})), None);
    }

    #[test]
    fn test_string_casts() {
        assert_eq!(cast_string(&json!("rss")).as_deref(), Some("rss"));
        assert_eq!(cast_string(&json!(42)).as_deref(), Some("42"));
        assert_eq!(cast_string(&json!(true)).as_deref(), Some("1"));
        assert_eq!(cast_string(&json!(false)).as_deref(), Some(""));
        assert_eq!(cast_string(&json!(["a"])), None);
    }

    #[test]
    fn test_uncastable_uses_default() {
        let request =
            ServerRequest::new().with_query_params(object(json!({"pageTypeMode": ["rss"]})));
        let args = ActionArguments::new(&request, "");
        assert_eq!(args.string("pageTypeMode", "default"), "default");
    }
}
