//! The one place that performs network I/O.
//!
//! The round trip (send plus full body read) races two optional cancellation
//! sources in a single `select!`: the internal deadline and the caller's
//! token. The losing branches are dropped when `select!` returns, which
//! disposes the timer and the token listener on every exit path.

use std::future;
use std::time::{Duration, Instant};

use reqwest::multipart;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::body::{MultipartForm, PartContent};
use crate::error::ClientError;
use crate::http::{Headers, HttpMethod, HttpRequest, HttpResponse, WireBody};

/// Execute `request`, giving up after `timeout` or when `cancel` fires.
pub(crate) async fn execute(
    http: &reqwest::Client,
    request: HttpRequest,
    timeout: Option<Duration>,
    cancel: Option<&CancellationToken>,
) -> Result<HttpResponse, ClientError> {
    let method = request.method;
    let url = request.url.clone();
    let builder = to_reqwest(http, request)?;
    let started = Instant::now();
    debug!(%method, %url, "sending request");

    let round_trip = async {
        let response = builder.send().await.map_err(ClientError::Transport)?;
        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().await.map_err(ClientError::Transport)?;
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    };

    let deadline = async {
        match timeout {
            Some(after) => tokio::time::sleep(after).await,
            None => future::pending().await,
        }
    };

    let cancelled = async {
        match cancel {
            Some(token) => token.cancelled().await,
            None => future::pending().await,
        }
    };

    let result = tokio::select! {
        biased;
        () = cancelled => {
            warn!(%method, %url, "request cancelled by caller");
            Err(ClientError::Cancelled)
        }
        result = round_trip => result,
        () = deadline => {
            let after = timeout.unwrap_or_default();
            warn!(%method, %url, timeout_ms = after.as_millis() as u64, "request timed out");
            Err(ClientError::Timeout { after })
        }
    };

    if let Ok(response) = &result {
        debug!(
            %method,
            %url,
            status = response.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );
    }
    result
}

fn to_reqwest(
    http: &reqwest::Client,
    request: HttpRequest,
) -> Result<reqwest::RequestBuilder, ClientError> {
    let method = match request.method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    };

    let mut builder = http.request(method, &request.url);
    for (name, value) in request.headers.iter() {
        builder = builder.header(name, value);
    }

    let builder = match request.body {
        WireBody::Empty => builder,
        WireBody::Bytes(bytes) => builder.body(bytes),
        WireBody::Multipart(form) => builder.multipart(to_multipart(form)?),
    };
    Ok(builder)
}

fn to_multipart(form: MultipartForm) -> Result<multipart::Form, ClientError> {
    let mut out = multipart::Form::new();
    for part in form.parts {
        let encoded = match part.content {
            PartContent::Text(text) => multipart::Part::text(text),
            PartContent::File {
                file_name,
                mime,
                data,
            } => {
                let file = multipart::Part::bytes(data.to_vec()).file_name(file_name);
                match mime {
                    Some(mime) => file.mime_str(&mime).map_err(ClientError::Multipart)?,
                    None => file,
                }
            }
        };
        out = out.part(part.name, encoded);
    }
    Ok(out)
}
