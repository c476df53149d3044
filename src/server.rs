//! HTTP API.
//!
//! Exposes the insight service as a small JSON API for chat front-ends and
//! scripts.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/status` | Knowledge store generation summary |
//! | `POST` | `/refresh` | Fetch pools and rebuild the index |
//! | `POST` | `/context` | Assembled context for a query |
//! | `POST` | `/search` | Raw ranked documents for a query |
//! | `GET`  | `/protocols` | Protocol aggregates |
//! | `POST` | `/prompt` | System prompt for a conversation |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "query must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `internal` (500). An unavailable
//! upstream is not an HTTP error: `/refresh` reports it with
//! `success: false`.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use lst_insight_core::models::{DocumentMetadata, ProtocolAggregate};

use crate::knowledge::KnowledgeStatus;
use crate::prompt::{BuiltPrompt, ChatMessage};
use crate::service::InsightService;

/// Characters of document content shown in search results.
const PREVIEW_CHARS: usize = 100;

pub fn router(service: Arc<InsightService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/status", get(handle_status))
        .route("/refresh", post(handle_refresh))
        .route("/context", post(handle_context))
        .route("/search", post(handle_search))
        .route("/protocols", get(handle_protocols))
        .route("/prompt", post(handle_prompt))
        .layer(cors)
        .with_state(service)
}

/// Serve the API on `service.config().server.bind` until the process ends.
pub async fn run_server(service: Arc<InsightService>) -> anyhow::Result<()> {
    let bind_addr = service.config().server.bind.clone();
    let app = router(service);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "insight server listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

fn require_query(query: &str) -> Result<&str, AppError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(bad_request("query must not be empty"));
    }
    Ok(query)
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /status ============

async fn handle_status(State(service): State<Arc<InsightService>>) -> Json<KnowledgeStatus> {
    Json(service.knowledge().status())
}

// ============ POST /refresh ============

#[derive(Deserialize, Default)]
struct RefreshRequest {
    #[serde(default)]
    force: bool,
}

#[derive(Serialize)]
struct RefreshResponse {
    success: bool,
    records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// The body is optional; an empty body means `{"force": false}`.
async fn handle_refresh(
    State(service): State<Arc<InsightService>>,
    body: Bytes,
) -> Result<Json<RefreshResponse>, AppError> {
    let request: RefreshRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RefreshRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| bad_request(format!("invalid body: {}", e)))?
    };

    let response = match service.refresh(request.force).await {
        Ok(outcome) => RefreshResponse {
            success: outcome.indexed,
            records: outcome.records,
            error: None,
        },
        Err(err) => RefreshResponse {
            success: false,
            records: 0,
            error: Some(err.to_string()),
        },
    };
    Ok(Json(response))
}

// ============ POST /context ============

#[derive(Deserialize)]
struct ContextRequest {
    query: String,
}

#[derive(Serialize)]
struct ContextResponse {
    query: String,
    context: String,
}

async fn handle_context(
    State(service): State<Arc<InsightService>>,
    Json(request): Json<ContextRequest>,
) -> Result<Json<ContextResponse>, AppError> {
    let query = require_query(&request.query)?;
    let context = service.context(query).await;
    Ok(Json(ContextResponse {
        query: query.to_string(),
        context,
    }))
}

// ============ POST /search ============

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    k: Option<usize>,
}

#[derive(Serialize)]
struct SearchResultItem {
    id: String,
    score: u32,
    metadata: DocumentMetadata,
    preview: String,
}

#[derive(Serialize)]
struct SearchResponse {
    query: String,
    results: Vec<SearchResultItem>,
}

async fn handle_search(
    State(service): State<Arc<InsightService>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let query = require_query(&request.query)?;
    let k = request.k.unwrap_or(service.config().retrieval.top_k);
    if k == 0 {
        return Err(bad_request("k must be >= 1"));
    }

    let hits = service
        .search(query, k)
        .await
        .map_err(|e| internal(e.to_string()))?;

    let results = hits
        .into_iter()
        .map(|hit| SearchResultItem {
            preview: preview(&hit.document.content),
            id: hit.document.id,
            score: hit.score,
            metadata: hit.document.metadata,
        })
        .collect();

    Ok(Json(SearchResponse {
        query: query.to_string(),
        results,
    }))
}

fn preview(content: &str) -> String {
    if content.chars().count() <= PREVIEW_CHARS {
        return content.to_string();
    }
    let mut out: String = content.chars().take(PREVIEW_CHARS).collect();
    out.push_str("...");
    out
}

// ============ GET /protocols ============

#[derive(Deserialize)]
struct ProtocolsQuery {
    #[serde(default)]
    force: bool,
    #[serde(default = "default_history")]
    history: bool,
}

fn default_history() -> bool {
    true
}

#[derive(Serialize)]
struct ProtocolsResponse {
    protocols: Vec<ProtocolAggregate>,
}

async fn handle_protocols(
    State(service): State<Arc<InsightService>>,
    Query(params): Query<ProtocolsQuery>,
) -> Json<ProtocolsResponse> {
    let protocols = service.protocols(params.force, params.history).await;
    Json(ProtocolsResponse { protocols })
}

// ============ POST /prompt ============

#[derive(Deserialize)]
struct PromptRequest {
    messages: Vec<ChatMessage>,
    #[serde(default)]
    force_refresh: bool,
}

async fn handle_prompt(
    State(service): State<Arc<InsightService>>,
    Json(request): Json<PromptRequest>,
) -> Result<Json<BuiltPrompt>, AppError> {
    if request.messages.is_empty() {
        return Err(bad_request("messages must not be empty"));
    }
    Ok(Json(
        service.prompt(request.messages, request.force_refresh).await,
    ))
}
