//! Request bodies and the body encoding policy.
//!
//! # Design
//! `Body::Json` is the only kind the client re-encodes. Every other kind is a
//! pass-through body: its bytes go to the wire untouched and no JSON content
//! type is forced. `Text` and `UrlEncoded` carry the content type a transport
//! would pick on its own, applied only when the caller set none. `Multipart`
//! strips any caller `Content-Type`, since the boundary is only known once the
//! transport encodes the form.

use bytes::Bytes;
use serde::Serialize;
use url::form_urlencoded;

use crate::error::ClientError;
use crate::http::{Headers, WireBody};

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain;charset=UTF-8";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded;charset=UTF-8";

/// A request body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Structured value, sent as JSON text.
    Json(serde_json::Value),
    Text(String),
    UrlEncoded(Vec<(String, String)>),
    Bytes(Bytes),
    Multipart(MultipartForm),
}

impl Body {
    /// Serialize `value` into a `Body::Json`.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ClientError> {
        serde_json::to_value(value)
            .map(Body::Json)
            .map_err(ClientError::Serialization)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Body::Text(text.into())
    }

    pub fn url_encoded<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Body::UrlEncoded(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn is_pass_through(&self) -> bool {
        !matches!(self, Body::Json(_))
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Json(value)
    }
}

impl From<MultipartForm> for Body {
    fn from(form: MultipartForm) -> Self {
        Body::Multipart(form)
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

/// Multipart form as plain data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub content: PartContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartContent {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        data: Bytes,
    },
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part {
            name: name.into(),
            content: PartContent::Text(value.into()),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<&str>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            content: PartContent::File {
                file_name: file_name.into(),
                mime: mime.map(str::to_string),
                data: data.into(),
            },
        });
        self
    }
}

/// Apply the encoding policy: the final headers (caller overrides win) and
/// the wire body.
pub fn encode(body: Option<&Body>, caller: &Headers) -> Result<(Headers, WireBody), ClientError> {
    let mut headers = Headers::new();
    let wire = match body {
        None | Some(Body::Json(serde_json::Value::Null)) => WireBody::Empty,
        Some(Body::Json(value)) => {
            let text = serde_json::to_string(value).map_err(ClientError::Serialization)?;
            headers.set("Content-Type", JSON_CONTENT_TYPE);
            WireBody::Bytes(Bytes::from(text))
        }
        Some(Body::Text(text)) => {
            headers.set("Content-Type", TEXT_CONTENT_TYPE);
            WireBody::Bytes(Bytes::from(text.clone()))
        }
        Some(Body::UrlEncoded(pairs)) => {
            let encoded = form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs)
                .finish();
            headers.set("Content-Type", FORM_CONTENT_TYPE);
            WireBody::Bytes(Bytes::from(encoded))
        }
        Some(Body::Bytes(bytes)) => WireBody::Bytes(bytes.clone()),
        Some(Body::Multipart(form)) => WireBody::Multipart(form.clone()),
    };

    headers.merge(caller);
    if matches!(wire, WireBody::Multipart(_)) {
        headers.remove("Content-Type");
    }
    Ok((headers, wire))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn wire_text(wire: &WireBody) -> &str {
        match wire {
            WireBody::Bytes(bytes) => std::str::from_utf8(bytes).unwrap(),
            other => panic!("expected bytes, got {other:?}"),
        }
    }

    #[test]
    fn json_body_sets_content_type() {
        let body = Body::json(&json!({"name": "Roadmap", "slug": "roadmap"})).unwrap();
        let (headers, wire) = encode(Some(&body), &Headers::new()).unwrap();
        assert_eq!(headers.get("content-type"), Some(JSON_CONTENT_TYPE));
        let sent: serde_json::Value = serde_json::from_str(wire_text(&wire)).unwrap();
        assert_eq!(sent["slug"], "roadmap");
    }

    #[test]
    fn json_scalars_are_sent_as_json() {
        let (headers, wire) = encode(Some(&Body::Json(json!("x"))), &Headers::new()).unwrap();
        assert_eq!(headers.get("content-type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(wire_text(&wire), r#""x""#);

        let (_, wire) = encode(Some(&Body::Json(json!(5))), &Headers::new()).unwrap();
        assert_eq!(wire_text(&wire), "5");

        let (headers, wire) = encode(Some(&Body::text("x")), &Headers::new()).unwrap();
        assert_eq!(headers.get("content-type"), Some(TEXT_CONTENT_TYPE));
        assert_eq!(wire_text(&wire), "x");
    }

    #[test]
    fn caller_content_type_is_never_overwritten() {
        let caller = Headers::new().with("content-type", "application/merge-patch+json");
        let (headers, _) = encode(Some(&Body::Json(json!({"a": 1}))), &caller).unwrap();
        assert_eq!(headers.get("Content-Type"), Some("application/merge-patch+json"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn absent_and_null_bodies_send_nothing() {
        let (headers, wire) = encode(None, &Headers::new()).unwrap();
        assert!(headers.is_empty());
        assert_eq!(wire, WireBody::Empty);

        let (headers, wire) = encode(Some(&Body::Json(serde_json::Value::Null)), &Headers::new()).unwrap();
        assert!(headers.is_empty());
        assert_eq!(wire, WireBody::Empty);
    }

    #[test]
    fn multipart_passes_through_and_drops_content_type() {
        let form = MultipartForm::new().text("title", "Bug").file(
            "attachment",
            "trace.txt",
            Some("text/plain"),
            Bytes::from_static(b"stack"),
        );
        let caller = Headers::new().with("Content-Type", "application/json").with("X-Req", "1");
        let (headers, wire) = encode(Some(&Body::Multipart(form.clone())), &caller).unwrap();
        assert!(!headers.contains("content-type"));
        assert_eq!(headers.get("x-req"), Some("1"));
        assert_eq!(wire, WireBody::Multipart(form));
    }

    #[test]
    fn bytes_are_sent_untouched_without_content_type() {
        let raw = Bytes::from_static(&[0, 159, 146, 150]);
        let (headers, wire) = encode(Some(&Body::Bytes(raw.clone())), &Headers::new()).unwrap();
        assert!(headers.is_empty());
        assert_eq!(wire, WireBody::Bytes(raw));
    }

    #[test]
    fn text_is_not_json_encoded() {
        let (headers, wire) = encode(Some(&Body::text("hello \"world\"")), &Headers::new()).unwrap();
        assert_eq!(wire_text(&wire), "hello \"world\"");
        assert_eq!(headers.get("content-type"), Some(TEXT_CONTENT_TYPE));
    }

    #[test]
    fn url_encoded_pairs() {
        let body = Body::url_encoded([("title", "a b"), ("status", "open")]);
        let caller = Headers::new().with("Content-Type", "application/x-www-form-urlencoded");
        let (headers, wire) = encode(Some(&body), &caller).unwrap();
        assert_eq!(wire_text(&wire), "title=a+b&status=open");
        assert_eq!(headers.get("content-type"), Some("application/x-www-form-urlencoded"));
    }
}
