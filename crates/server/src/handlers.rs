//! Request handlers

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::{Stream, StreamExt};
use ragline_rag::{Query as UserQuery, RagResult, ResponseEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;

/// Characters of the query kept in log lines.
const LOG_QUERY_CHARS: usize = 100;

fn default_use_search() -> bool {
    true
}

/// Chat parameters, from the query string or a JSON body.
#[derive(Debug, Deserialize)]
pub struct ChatParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default = "default_use_search")]
    pub use_search: bool,
}

#[derive(Debug, Serialize)]
pub struct SimpleChatResponse {
    pub success: bool,
    pub data: RagResult,
    pub message: String,
}

impl ChatParams {
    fn validate(self, endpoint: &str) -> Result<(UserQuery, bool), ApiError> {
        let query = UserQuery::parse(self.query.unwrap_or_default())?;
        tracing::info!(
            "{} request received - Query: {}",
            endpoint,
            query.preview(LOG_QUERY_CHARS)
        );
        Ok((query, self.use_search))
    }
}

/// Service information
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Ragline RAG API",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
        "endpoints": {
            "chat_streaming": "/api/v1/chat",
            "chat_simple": "/api/v1/chat/simple",
            "health": "/api/v1/health"
        }
    }))
}

/// Liveness check
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "Ragline RAG API is running",
        "endpoints": {
            "streaming_chat": "/api/v1/chat",
            "simple_chat": "/api/v1/chat/simple",
            "health": "/api/v1/health"
        }
    }))
}

/// Stream a response as Server-Sent Events (query string).
pub async fn chat_get(
    State(state): State<AppState>,
    params: Result<Query<ChatParams>, QueryRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (query, use_search) = params.validate("Chat")?;
    Ok(event_stream(&state, query, use_search))
}

/// Stream a response as Server-Sent Events (JSON body).
pub async fn chat_post(
    State(state): State<AppState>,
    body: Result<Json<ChatParams>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let Json(params) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (query, use_search) = params.validate("Chat POST")?;
    Ok(event_stream(&state, query, use_search))
}

/// Answer without streaming, with search metadata.
pub async fn chat_simple(
    State(state): State<AppState>,
    params: Result<Query<ChatParams>, QueryRejection>,
) -> Result<Json<SimpleChatResponse>, ApiError> {
    let Query(params) = params.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (query, use_search) = params.validate("Simple chat")?;

    let result = state.chain.run_with_metadata(&query, use_search).await;

    Ok(Json(SimpleChatResponse {
        success: true,
        data: result,
        message: "Response generated successfully".to_string(),
    }))
}

fn event_stream(
    state: &AppState,
    query: UserQuery,
    use_search: bool,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = state
        .chain
        .stream(query, use_search)
        .map(|event| Ok(to_sse(event)));

    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse(event: ResponseEvent) -> Event {
    // Collapse CRLF inside a token so it is not split into two data lines.
    let data = event.data.replace("\r\n", "\n");
    Event::default().event(event.kind.as_str()).data(data)
}
