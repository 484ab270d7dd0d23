//! Case-insensitive redaction of headers, query parameters, and body fields.

use std::collections::HashSet;

use axum::http::HeaderMap;
use serde_json::{Map, Value};

/// Replaces redacted values.
pub const REDACTED: &str = "[REDACTED]";

/// Appended to body text cut at the configured maximum.
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Name sets whose values must never reach a log record.
#[derive(Debug, Clone, Default)]
pub struct Redactor {
    headers: HashSet<String>,
    query: HashSet<String>,
    body_fields: HashSet<String>,
}

impl Redactor {
    pub fn new(headers: &[String], query: &[String], body_fields: &[String]) -> Self {
        Self {
            headers: lowercase_set(headers),
            query: lowercase_set(query),
            body_fields: lowercase_set(body_fields),
        }
    }

    /// Headers as a JSON map. Repeated headers become arrays.
    pub fn headers(&self, headers: &HeaderMap) -> Map<String, Value> {
        let mut out = Map::new();
        for name in headers.keys() {
            let key = name.as_str();
            let value = if self.headers.contains(&key.to_ascii_lowercase()) {
                Value::String(REDACTED.to_string())
            } else {
                let mut values: Vec<Value> = headers
                    .get_all(name)
                    .iter()
                    .map(|v| Value::String(String::from_utf8_lossy(v.as_bytes()).into_owned()))
                    .collect();
                if values.len() == 1 {
                    values.pop().unwrap_or(Value::Null)
                } else {
                    Value::Array(values)
                }
            };
            out.insert(key.to_string(), value);
        }
        out
    }

    /// Query string as a JSON map. Repeated parameters become arrays.
    pub fn query(&self, query: Option<&str>) -> Map<String, Value> {
        let mut out = Map::new();
        let Some(query) = query else {
            return out;
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = if self.query.contains(&key.to_lowercase()) {
                Value::String(REDACTED.to_string())
            } else {
                Value::String(value.into_owned())
            };
            append(&mut out, key.into_owned(), value);
        }
        out
    }

    /// `path` plus its query string, re-encoded with redacted values replaced.
    pub fn url(&self, path: &str, query: Option<&str>) -> String {
        let Some(query) = query.filter(|q| !q.is_empty()) else {
            return path.to_string();
        };

        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if self.query.contains(&key.to_lowercase()) {
                serializer.append_pair(&key, REDACTED);
            } else {
                serializer.append_pair(&key, &value);
            }
        }
        format!("{path}?{}", serializer.finish())
    }

    /// Redact top-level fields of a JSON object. Other values pass through.
    pub fn body(&self, body: Value) -> Value {
        match body {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(key, value)| {
                        if self.body_fields.contains(&key.to_lowercase()) {
                            (key, Value::String(REDACTED.to_string()))
                        } else {
                            (key, value)
                        }
                    })
                    .collect(),
            ),
            other => other,
        }
    }
}

/// Cut `text` to `max` characters, appending [`TRUNCATION_MARKER`] if anything was dropped.
pub fn truncate_text(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => {
            let (head, _) = text.split_at(cut);
            format!("{head}{TRUNCATION_MARKER}")
        }
        None => text.to_string(),
    }
}

/// Form-encoded body as a JSON object, with repeated keys collected into arrays.
pub(crate) fn form_to_json(bytes: &[u8]) -> Value {
    let mut out = Map::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        append(&mut out, key.into_owned(), Value::String(value.into_owned()));
    }
    Value::Object(out)
}

fn append(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(existing)) => existing.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

fn lowercase_set(names: &[String]) -> HashSet<String> {
    names.iter().map(|n| n.to_lowercase()).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    fn redactor() -> Redactor {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Redactor::new(
            &names(&["Authorization", "cookie"]),
            &names(&["token", "PASSWORD"]),
            &names(&["password", "ssn", "token"]),
        )
    }

    #[test]
    fn test_headers_redacted_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        headers.insert("cookie", HeaderValue::from_static("sid=1"));
        headers.insert("accept", HeaderValue::from_static("application/json"));

        let out = redactor().headers(&headers);

        assert_eq!(out["authorization"], REDACTED);
        assert_eq!(out["cookie"], REDACTED);
        assert_eq!(out["accept"], "application/json");
    }

    #[test]
    fn test_repeated_headers_become_array() {
        let mut headers = HeaderMap::new();
        headers.append("x-tag", HeaderValue::from_static("a"));
        headers.append("x-tag", HeaderValue::from_static("b"));

        let out = redactor().headers(&headers);
        assert_eq!(out["x-tag"], json!(["a", "b"]));
    }

    #[test]
    fn test_query_redacted_case_insensitive() {
        let out = redactor().query(Some("Token=abc&password=hunter2&page=2"));

        assert_eq!(out["Token"], REDACTED);
        assert_eq!(out["password"], REDACTED);
        assert_eq!(out["page"], "2");
    }

    #[test]
    fn test_query_repeated_and_decoded() {
        let out = redactor().query(Some("tag=a&tag=b%20c"));
        assert_eq!(out["tag"], json!(["a", "b c"]));
    }

    #[test]
    fn test_query_none() {
        assert!(redactor().query(None).is_empty());
    }

    #[test]
    fn test_url_query_values_redacted() {
        let url = redactor().url("/api/users", Some("token=abc123&page=2&Password=x"));

        assert_eq!(url, "/api/users?token=%5BREDACTED%5D&page=2&Password=%5BREDACTED%5D");
        assert!(!url.contains("abc123"));
    }

    #[test]
    fn test_url_reencodes_kept_values() {
        let url = redactor().url("/search", Some("q=a%20b&tag=x"));
        assert_eq!(url, "/search?q=a+b&tag=x");
    }

    #[test]
    fn test_url_without_query() {
        assert_eq!(redactor().url("/api/health", None), "/api/health");
        assert_eq!(redactor().url("/api/health", Some("")), "/api/health");
    }

    #[test]
    fn test_body_top_level_only() {
        let body = json!({
            "Password": "hunter2",
            "name": "Ada",
            "nested": {"password": "kept"}
        });

        let out = redactor().body(body);

        assert_eq!(out["Password"], REDACTED);
        assert_eq!(out["name"], "Ada");
        assert_eq!(out["nested"]["password"], "kept");
    }

    #[test]
    fn test_body_non_object_untouched() {
        let body = json!([{"password": "x"}]);
        assert_eq!(redactor().body(body.clone()), body);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 5), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...[truncated]");
    }

    #[test]
    fn test_truncate_counts_characters() {
        let out = truncate_text("ééééé", 3);
        assert_eq!(out, "ééé...[truncated]");
        let kept = out.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(kept.chars().count(), 3);
    }

    #[test]
    fn test_form_to_json() {
        let out = form_to_json(b"name=Ada&password=x&tag=1&tag=2");
        assert_eq!(out, json!({"name": "Ada", "password": "x", "tag": ["1", "2"]}));
    }
}
