//! Typed wrappers for the board and issue endpoints.

use uuid::Uuid;

use crate::body::Body;
use crate::client::{ApiClient, RequestOptions};
use crate::error::ClientError;
use crate::types::{
    Board, BoardPage, CreateBoard, CreateIssue, Issue, IssuePage, IssueQuery, IssueStatus,
    UpdateIssueStatus,
};

impl ApiClient {
    pub fn boards(&self) -> Boards<'_> {
        Boards { client: self }
    }

    pub fn issues(&self) -> Issues<'_> {
        Issues { client: self }
    }
}

/// `/api/boards` endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Boards<'a> {
    client: &'a ApiClient,
}

impl Boards<'_> {
    pub async fn list(&self, options: RequestOptions) -> Result<Vec<Board>, ClientError> {
        self.client.get("/api/boards", options).await
    }

    pub async fn create(&self, input: &CreateBoard, options: RequestOptions) -> Result<Board, ClientError> {
        self.client.post("/api/boards", Body::json(input)?, options).await
    }

    /// The board plus the first page of its issues.
    pub async fn by_slug(&self, slug: &str, options: RequestOptions) -> Result<BoardPage, ClientError> {
        self.client.get(&format!("/api/boards/{slug}"), options).await
    }
}

/// Issue endpoints.
#[derive(Debug, Clone, Copy)]
pub struct Issues<'a> {
    client: &'a ApiClient,
}

impl Issues<'_> {
    pub async fn list(
        &self,
        slug: &str,
        filter: &IssueQuery,
        options: RequestOptions,
    ) -> Result<IssuePage, ClientError> {
        let options = options.query(filter.to_query());
        self.client.get(&format!("/api/boards/{slug}/issues"), options).await
    }

    pub async fn create(
        &self,
        slug: &str,
        input: &CreateIssue,
        options: RequestOptions,
    ) -> Result<Issue, ClientError> {
        self.client
            .post(&format!("/api/boards/{slug}/issues"), Body::json(input)?, options)
            .await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: IssueStatus,
        options: RequestOptions,
    ) -> Result<Issue, ClientError> {
        let body = Body::json(&UpdateIssueStatus { status })?;
        self.client.patch(&format!("/api/issues/{id}/status"), body, options).await
    }
}
