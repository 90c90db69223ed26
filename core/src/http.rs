//! HTTP transport types for the tracker API client.
//!
//! # Design
//! Requests and responses are described as plain data. `ApiClient` builds an
//! `HttpRequest` and parses an `HttpResponse` without touching the network;
//! only `transport` performs I/O. Keeping the two halves pure makes the body
//! encoding and error extraction testable without a server.
//!
//! Header names are compared case-insensitively but stored with the casing
//! they were given, so the wire request shows what the caller wrote.

use std::fmt;

use bytes::Bytes;

use crate::body::MultipartForm;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered header list with case-insensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name`, replacing any existing entry with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(&name)) {
            Some(entry) => *entry = (name, value),
            None => self.0.push((name, value)),
        }
    }

    /// Builder form of [`Headers::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) {
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    /// Overlay `other` on top of `self`; entries in `other` win.
    pub fn merge(&mut self, other: &Headers) {
        for (name, value) in &other.0 {
            self.set(name.clone(), value.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.set(k, v);
        }
        headers
    }
}

/// `Authorization: Bearer {token}` for a present, non-empty token; otherwise
/// no headers at all.
pub fn bearer(token: Option<&str>) -> Headers {
    match token {
        Some(token) if !token.is_empty() => {
            Headers::new().with("Authorization", format!("Bearer {token}"))
        }
        _ => Headers::new(),
    }
}

/// Body as it goes on the wire, after the encoding policy has run.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum WireBody {
    #[default]
    Empty,
    Bytes(Bytes),
    /// Encoded by the transport so it can choose the boundary.
    Multipart(MultipartForm),
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient::build_request`. `url` is absolute: base URL, path and
/// encoded query.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: WireBody,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Headers,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> &str {
        self.headers.get("content-type").unwrap_or("")
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_case_insensitively() {
        let mut headers = Headers::new().with("content-type", "text/plain");
        headers.set("Content-Type", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn merge_lets_overrides_win() {
        let mut derived = Headers::new().with("Content-Type", "application/json");
        let caller = Headers::new()
            .with("content-type", "application/vnd.api+json")
            .with("X-Trace", "abc");
        derived.merge(&caller);
        assert_eq!(derived.get("Content-Type"), Some("application/vnd.api+json"));
        assert_eq!(derived.get("x-trace"), Some("abc"));
        assert_eq!(derived.len(), 2);
    }

    #[test]
    fn remove_drops_every_casing() {
        let mut headers = Headers::new().with("Content-Type", "a").with("Accept", "b");
        headers.remove("content-type");
        assert!(!headers.contains("Content-Type"));
        assert!(headers.contains("accept"));
    }

    #[test]
    fn bearer_with_token() {
        let headers = bearer(Some("abc123"));
        assert_eq!(headers.get("authorization"), Some("Bearer abc123"));
    }

    #[test]
    fn bearer_without_token_is_empty() {
        assert!(bearer(None).is_empty());
        assert!(bearer(Some("")).is_empty());
    }

    #[test]
    fn response_success_range() {
        let mut response = HttpResponse {
            status: 204,
            headers: Headers::new(),
            body: Bytes::new(),
        };
        assert!(response.is_success());
        response.status = 302;
        assert!(!response.is_success());
        response.status = 199;
        assert!(!response.is_success());
    }
}
