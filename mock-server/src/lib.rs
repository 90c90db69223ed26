use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

const DEFAULT_TAKE: usize = 20;
const MAX_TAKE: usize = 100;
const STATUSES: [&str; 3] = ["open", "in_progress", "done"];

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Status updates answer with this narrower projection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IssueStatusView {
    pub id: Uuid,
    pub title: String,
    pub status: String,
}

#[derive(Clone, Debug)]
struct IssueRecord {
    board_id: Uuid,
    issue: Issue,
}

#[derive(Deserialize)]
pub struct CreateBoard {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateIssue {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateStatus {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct PageParams {
    pub status: Option<String>,
    pub take: Option<String>,
    pub cursor: Option<String>,
}

/// Records in insertion order; listings walk it newest first.
#[derive(Default)]
pub struct Store {
    boards: Vec<Board>,
    issues: Vec<IssueRecord>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/healthz", get(health))
        .route("/api/boards", get(list_boards).post(create_board))
        .route("/api/boards/{slug}", get(board_by_slug))
        .route("/api/boards/{slug}/issues", get(list_issues).post(create_issue))
        .route("/api/issues/{id}/status", patch(update_status))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Error body variants the API answers with.
#[derive(Debug)]
enum ApiError {
    NotFound(&'static str),
    Conflict(&'static str),
    /// Validator-style `{"issues": [{"path": [..], "message": ..}]}`.
    Invalid(Vec<(&'static str, String)>),
    /// Field map `{"errors": {"field": [..]}}`.
    BadParams(Vec<(&'static str, String)>),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, Json(json!({ "error": msg }))).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, Json(json!({ "error": msg }))).into_response(),
            ApiError::Invalid(problems) => {
                let issues: Vec<_> = problems
                    .into_iter()
                    .map(|(field, message)| json!({ "path": [field], "message": message }))
                    .collect();
                (StatusCode::BAD_REQUEST, Json(json!({ "issues": issues }))).into_response()
            }
            ApiError::BadParams(problems) => {
                let mut errors = serde_json::Map::new();
                for (field, message) in problems {
                    errors.insert(field.to_string(), json!([message]));
                }
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

async fn list_boards(State(db): State<Db>) -> Json<Vec<Board>> {
    let store = db.read().await;
    Json(store.boards.iter().rev().cloned().collect())
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

async fn create_board(
    State(db): State<Db>,
    Json(input): Json<CreateBoard>,
) -> Result<(StatusCode, Json<Board>), ApiError> {
    let name = input.name.unwrap_or_default();
    let slug = input.slug.unwrap_or_default();

    let mut problems = Vec::new();
    if name.is_empty() {
        problems.push(("name", "name is required".to_string()));
    }
    if slug.is_empty() {
        problems.push(("slug", "slug is required".to_string()));
    } else if !is_valid_slug(&slug) {
        problems.push(("slug", "slug may only contain a-z, 0-9 and -".to_string()));
    }
    if !problems.is_empty() {
        return Err(ApiError::Invalid(problems));
    }

    let mut store = db.write().await;
    if store.boards.iter().any(|b| b.slug == slug) {
        return Err(ApiError::Conflict("Board slug already exists"));
    }
    let board = Board {
        id: Uuid::new_v4(),
        name,
        slug,
        created_at: Utc::now(),
    };
    store.boards.push(board.clone());
    Ok((StatusCode::CREATED, Json(board)))
}

/// Newest-first page of a board's issues, after `cursor` (exclusive).
fn page(
    store: &Store,
    board_id: Uuid,
    params: &PageParams,
) -> Result<(Vec<Issue>, Option<Uuid>), ApiError> {
    let mut problems = Vec::new();

    let take = match params.take.as_deref() {
        None => DEFAULT_TAKE,
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) => n.min(MAX_TAKE),
            Err(_) => {
                problems.push(("take", "take must be a non-negative integer".to_string()));
                0
            }
        },
    };

    let cursor = match params.cursor.as_deref() {
        None | Some("") => None,
        Some(raw) => match raw.parse::<Uuid>() {
            Ok(id) => Some(id),
            Err(_) => {
                problems.push(("cursor", "cursor must be an issue id".to_string()));
                None
            }
        },
    };

    let status = params.status.as_deref().filter(|s| !s.is_empty());

    let matching: Vec<&Issue> = store
        .issues
        .iter()
        .rev()
        .filter(|r| r.board_id == board_id)
        .filter(|r| status.map_or(true, |s| r.issue.status == s))
        .map(|r| &r.issue)
        .collect();

    let start = match cursor {
        None => 0,
        Some(id) => match matching.iter().position(|i| i.id == id) {
            Some(pos) => pos + 1,
            None => {
                problems.push(("cursor", "unknown cursor".to_string()));
                0
            }
        },
    };

    if !problems.is_empty() {
        return Err(ApiError::BadParams(problems));
    }

    let items: Vec<Issue> = matching.into_iter().skip(start).take(take).cloned().collect();
    let next_cursor = match items.last() {
        Some(last) if take > 0 && items.len() == take => Some(last.id),
        _ => None,
    };
    Ok((items, next_cursor))
}

async fn board_by_slug(
    State(db): State<Db>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = db.read().await;
    let board = store
        .boards
        .iter()
        .find(|b| b.slug == slug)
        .ok_or(ApiError::NotFound("Board not found"))?;
    // The board view lists every status.
    let params = PageParams {
        status: None,
        ..params
    };
    let (issues, next_cursor) = page(&store, board.id, &params)?;
    Ok(Json(json!({ "board": board, "issues": issues, "nextCursor": next_cursor })))
}

async fn list_issues(
    State(db): State<Db>,
    Path(slug): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let store = db.read().await;
    let board = store
        .boards
        .iter()
        .find(|b| b.slug == slug)
        .ok_or(ApiError::NotFound("Board not found"))?;
    let (items, next_cursor) = page(&store, board.id, &params)?;
    Ok(Json(json!({ "items": items, "nextCursor": next_cursor })))
}

async fn create_issue(
    State(db): State<Db>,
    Path(slug): Path<String>,
    Json(input): Json<CreateIssue>,
) -> Result<(StatusCode, Json<Issue>), ApiError> {
    let title = input.title.unwrap_or_default();
    if title.is_empty() {
        return Err(ApiError::Invalid(vec![("title", "title is required".to_string())]));
    }

    let mut store = db.write().await;
    let board_id = store
        .boards
        .iter()
        .find(|b| b.slug == slug)
        .map(|b| b.id)
        .ok_or(ApiError::NotFound("Board not found"))?;
    let issue = Issue {
        id: Uuid::new_v4(),
        title,
        status: "open".to_string(),
        description: input.description.filter(|d| !d.is_empty()),
        created_at: Utc::now(),
    };
    store.issues.push(IssueRecord {
        board_id,
        issue: issue.clone(),
    });
    Ok((StatusCode::CREATED, Json(issue)))
}

async fn update_status(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStatus>,
) -> Result<Json<IssueStatusView>, ApiError> {
    let status = input.status.unwrap_or_default();
    if !STATUSES.contains(&status.as_str()) {
        return Err(ApiError::Invalid(vec![(
            "status",
            format!("status must be one of {}", STATUSES.join(", ")),
        )]));
    }

    let mut store = db.write().await;
    let record = store
        .issues
        .iter_mut()
        .find(|r| r.issue.id == id)
        .ok_or(ApiError::NotFound("Issue not found"))?;
    record.issue.status = status;
    Ok(Json(IssueStatusView {
        id,
        title: record.issue.title.clone(),
        status: record.issue.status.clone(),
    }))
}
