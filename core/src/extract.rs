//! Error detail extraction from failed responses.
//!
//! # Design
//! Server error bodies come in several shapes: `{"error": ..}`,
//! `{"message": ..}`, `{"detail": ..}`, `{"errors": [..]}`,
//! `{"errors": {"field": [..]}}` and validator-style
//! `{"issues": [{"message": ..}]}`, nested arbitrarily. The JSON is first
//! lifted into `Extractable`, a tagged union with one case per shape that
//! matters, and a pure recursive resolver walks it. Empty strings never count
//! as a resolved detail.

use serde_json::Value;

/// JSON value viewed only through the shapes that can carry a message.
#[derive(Debug, Clone, PartialEq)]
pub enum Extractable<'a> {
    Text(&'a str),
    List(Vec<Extractable<'a>>),
    Map(Vec<(&'a str, Extractable<'a>)>),
    /// Numbers, booleans and null.
    Opaque,
}

impl<'a> From<&'a Value> for Extractable<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::String(s) => Extractable::Text(s),
            Value::Array(items) => Extractable::List(items.iter().map(Extractable::from).collect()),
            Value::Object(map) => {
                Extractable::Map(map.iter().map(|(k, v)| (k.as_str(), Extractable::from(v))).collect())
            }
            Value::Null | Value::Bool(_) | Value::Number(_) => Extractable::Opaque,
        }
    }
}

impl<'a> Extractable<'a> {
    fn field(&self, key: &str) -> Option<&Extractable<'a>> {
        match self {
            Extractable::Map(entries) => entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    fn direct_text(&self, key: &str) -> Option<String> {
        match self.field(key) {
            Some(Extractable::Text(s)) if !s.is_empty() => Some((*s).to_string()),
            _ => None,
        }
    }

    /// First useful message in this value, if any.
    pub fn resolve(&self) -> Option<String> {
        match self {
            Extractable::Text(s) => non_empty((*s).to_string()),
            Extractable::List(items) => join(items.iter().filter_map(Extractable::resolve)),
            Extractable::Map(entries) => self
                .resolve_known_keys()
                .or_else(|| entries.iter().find_map(|(_, v)| v.resolve())),
            Extractable::Opaque => None,
        }
    }

    /// Steps shared by the resolver and the top-level detail reader:
    /// direct keys, then `errors`, then `issues`.
    fn resolve_known_keys(&self) -> Option<String> {
        ["error", "message", "detail"]
            .iter()
            .find_map(|key| self.direct_text(key))
            .or_else(|| self.field("errors").and_then(resolve_errors))
            .or_else(|| self.field("issues").and_then(resolve_issues))
    }
}

fn resolve_errors(errors: &Extractable<'_>) -> Option<String> {
    match errors {
        Extractable::List(items) => join(items.iter().filter_map(Extractable::resolve)),
        Extractable::Map(entries) => join(entries.iter().filter_map(|(_, v)| v.resolve())),
        other => other.resolve(),
    }
}

fn resolve_issues(issues: &Extractable<'_>) -> Option<String> {
    match issues {
        Extractable::List(items) => join(items.iter().filter_map(|issue| {
            issue
                .direct_text("message")
                .or_else(|| issue.resolve())
        })),
        other => other.resolve(),
    }
}

fn join(parts: impl Iterator<Item = String>) -> Option<String> {
    non_empty(parts.collect::<Vec<_>>().join("; "))
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Best-effort human-readable detail from a failed response body.
///
/// Only a JSON object is inspected: the known keys, then a scan of every
/// value, then the serialized object. Any other body, JSON lists and bare
/// strings included, is returned as raw text.
pub fn read_error_detail(body: &[u8]) -> String {
    if let Ok(value @ Value::Object(_)) = serde_json::from_slice::<Value>(body) {
        let extractable = Extractable::from(&value);
        if let Extractable::Map(entries) = &extractable {
            return extractable
                .resolve_known_keys()
                .or_else(|| entries.iter().find_map(|(_, v)| v.resolve()))
                .unwrap_or_else(|| value.to_string());
        }
    }
    String::from_utf8_lossy(body).into_owned()
}

/// Message for a failed response: `HTTP {status}`, plus ` – {detail}` when
/// there is one.
pub fn http_error_message(status: u16, detail: &str) -> String {
    if detail.is_empty() {
        format!("HTTP {status}")
    } else {
        format!("HTTP {status} – {detail}").trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn detail(value: Value) -> String {
        read_error_detail(value.to_string().as_bytes())
    }

    #[test]
    fn direct_keys_in_priority_order() {
        assert_eq!(detail(json!({"error": "Board not found"})), "Board not found");
        assert_eq!(detail(json!({"message": "m", "detail": "d"})), "m");
        assert_eq!(detail(json!({"detail": "d", "errors": ["e"]})), "d");
        assert_eq!(detail(json!({"message": "m", "error": "e"})), "e");
    }

    #[test]
    fn empty_direct_string_is_skipped() {
        assert_eq!(detail(json!({"error": "", "message": "used"})), "used");
    }

    #[test]
    fn validator_issues() {
        let body = json!({"issues": [{"message": "name is required"}, {"message": "slug invalid"}]});
        assert_eq!(detail(body), "name is required; slug invalid");
    }

    #[test]
    fn issues_without_message_fall_back_to_resolution() {
        let body = json!({"issues": [{"code": "too_small"}, "plain", {"message": 3, "hint": "h"}]});
        assert_eq!(detail(body), "too_small; plain; h");
    }

    #[test]
    fn errors_map_in_key_order() {
        let body = json!({"errors": {"slug": ["must be lowercase"], "name": ["required"]}});
        assert_eq!(detail(body), "must be lowercase; required");
    }

    #[test]
    fn errors_list_with_nesting() {
        let body = json!({"errors": ["first", ["second", "third"], {"message": "fourth"}, 42]});
        assert_eq!(detail(body), "first; second; third; fourth");
    }

    #[test]
    fn errors_map_mixes_strings_and_lists() {
        let body = json!({"errors": {"title": "too long", "tags": ["dup", "empty"]}});
        assert_eq!(detail(body), "too long; dup; empty");
    }

    #[test]
    fn scans_other_values_when_known_keys_miss() {
        let body = json!({"code": 17, "context": {"reason": "quota exceeded"}});
        assert_eq!(detail(body), "quota exceeded");
    }

    #[test]
    fn serializes_object_when_nothing_resolves() {
        let body = json!({"code": 17, "retry": false});
        assert_eq!(detail(body), r#"{"code":17,"retry":false}"#);
    }

    #[test]
    fn empty_errors_fall_through_to_serialization() {
        let body = json!({"errors": []});
        assert_eq!(detail(body), r#"{"errors":[]}"#);
    }

    #[test]
    fn non_object_json_is_returned_verbatim() {
        assert_eq!(read_error_detail(br#"["a","b"]"#), r#"["a","b"]"#);
        assert_eq!(read_error_detail(br#""Board missing""#), r#""Board missing""#);
        assert_eq!(read_error_detail(b"null"), "null");
    }

    #[test]
    fn plain_text_body() {
        assert_eq!(read_error_detail(b"internal error"), "internal error");
        assert_eq!(read_error_detail(b""), "");
    }

    #[test]
    fn json_scalar_falls_back_to_raw_text() {
        assert_eq!(read_error_detail(b"500"), "500");
    }

    #[test]
    fn resolver_on_nested_map() {
        let value = json!({"outer": {"errors": {"field": ["deep"]}}});
        assert_eq!(Extractable::from(&value).resolve().as_deref(), Some("deep"));
    }

    #[test]
    fn message_format() {
        assert_eq!(http_error_message(404, "Board not found"), "HTTP 404 – Board not found");
        assert_eq!(http_error_message(502, ""), "HTTP 502");
        assert_eq!(http_error_message(500, "oops\n"), "HTTP 500 – oops");
    }
}
