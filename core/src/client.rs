//! HTTP request client for the tracker API.
//!
//! # Design
//! `ApiClient` holds the base URL, an optional default timeout and a
//! `reqwest::Client` handle; it carries no mutable state between calls.
//! Each call is split into `build_request` (pure: URL, query, headers, body
//! encoding), the transport round trip, and `parse_response` (pure: status
//! check, error extraction, payload decoding). The pure halves are tested
//! without a network.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::body::{self, Body};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::extract::read_error_detail;
use crate::http::{bearer, Headers, HttpMethod, HttpRequest, HttpResponse};
use crate::query::{with_query, Query};
use crate::transport;

/// Per-call options. `Default` is a bare GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub query: Query,
    /// Overrides for derived headers.
    pub headers: Headers,
    pub body: Option<Body>,
    /// Zero disables the client's default timeout for this call.
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Merge `Authorization: Bearer {token}` when a token is present.
    pub fn with_auth(mut self, token: Option<&str>) -> Self {
        self.headers.merge(&bearer(token));
        self
    }
}

/// Decoded success body, before it is typed.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// 204: the body was never read.
    NoContent,
    Json(Value),
    Text(String),
}

impl Payload {
    /// Type the payload. `NoContent` is offered to `T` as JSON `null`, so
    /// `()` and `Option<_>` receive their "no value"; text is offered as a
    /// JSON string.
    pub fn into_typed<T: DeserializeOwned>(self) -> Result<T, ClientError> {
        let value = match self {
            Payload::NoContent => Value::Null,
            Payload::Json(value) => value,
            Payload::Text(text) => Value::String(text),
        };
        serde_json::from_value(value).map_err(ClientError::Decode)
    }
}

/// Async client for the tracker API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    default_timeout: Option<Duration>,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tracker-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ClientError::Transport)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            default_timeout: None,
            http,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::new(&config.base_url)?.with_default_timeout(config.timeout))
    }

    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout.filter(|t| !t.is_zero());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_request(&self, path: &str, options: &RequestOptions) -> Result<HttpRequest, ClientError> {
        let (headers, body) = body::encode(options.body.as_ref(), &options.headers)?;
        Ok(HttpRequest {
            method: options.method,
            url: format!("{}{}", self.base_url, with_query(path, Some(&options.query))),
            headers,
            body,
        })
    }

    pub fn parse_response<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ClientError> {
        decode_payload(response)?.into_typed()
    }

    /// One round trip: build, send, parse.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let request = self.build_request(path, &options)?;
        let timeout = options
            .timeout
            .or(self.default_timeout)
            .filter(|t| !t.is_zero());
        let response = transport::execute(&self.http, request, timeout, options.cancel.as_ref()).await?;
        self.parse_response(response)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, ClientError> {
        self.request(path, options.method(HttpMethod::Get)).await
    }

    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        self.request(path, options.method(HttpMethod::Post).body(body)).await
    }

    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        self.request(path, options.method(HttpMethod::Put).body(body)).await
    }

    pub async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: impl Into<Body>,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        self.request(path, options.method(HttpMethod::Patch).body(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str, options: RequestOptions) -> Result<T, ClientError> {
        self.request(path, options.method(HttpMethod::Delete)).await
    }
}

/// Map a response to its payload, or to `ClientError::Http` for non-2xx.
pub fn decode_payload(response: HttpResponse) -> Result<Payload, ClientError> {
    if !response.is_success() {
        let detail = read_error_detail(&response.body);
        warn!(status = response.status, %detail, "request failed");
        return Err(ClientError::Http {
            status: response.status,
            detail,
        });
    }
    if response.status == 204 {
        return Ok(Payload::NoContent);
    }
    if response.content_type().contains("application/json") {
        let value = serde_json::from_slice(&response.body).map_err(ClientError::Decode)?;
        return Ok(Payload::Json(value));
    }
    Ok(Payload::Text(response.text()))
}
