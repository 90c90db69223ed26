//! Async API client core for the issue tracker service.
//!
//! # Overview
//! `ApiClient` performs single HTTP round trips against the tracker API:
//! query encoding, body encoding, timeout and caller cancellation, payload
//! decoding, and extraction of a readable detail from error bodies.
//!
//! # Design
//! - `ApiClient` is stateless between calls. It holds the base URL, an
//!   optional default timeout and a `reqwest::Client` handle.
//! - Every call is split into `build_request` (pure), the transport round
//!   trip, and `parse_response` (pure), so the I/O boundary is explicit.
//! - Error bodies are matched through the `Extractable` tagged union rather
//!   than ad hoc JSON probing.
//! - No retries, no caching. Every failure is returned as one `ClientError`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod body;
pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod query;
pub mod resources;
mod transport;
pub mod types;

pub use body::{Body, MultipartForm};
pub use client::{ApiClient, Payload, RequestOptions};
pub use config::ClientConfig;
pub use error::ClientError;
pub use extract::{read_error_detail, Extractable};
pub use http::{bearer, Headers, HttpMethod, HttpRequest, HttpResponse, WireBody};
pub use query::{with_query, Query, QueryValue};
pub use resources::{Boards, Issues};
pub use tokio_util::sync::CancellationToken;
pub use types::{
    Board, BoardPage, CreateBoard, CreateIssue, Issue, IssuePage, IssueQuery, IssueStatus,
    UpdateIssueStatus,
};
