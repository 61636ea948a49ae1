//! API request handlers

use std::sync::Arc;

use axum::body::Body;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use futures::StreamExt;
use tracing::error;
use tracing::info;
use tracing::Instrument;

use crate::api::types::ChatRequest;
use crate::api::types::HealthResponse;
use crate::errors::FolioRagError;
use crate::errors::Result;
use crate::llm::StreamingResponse;
use crate::rag::CompletionRelay;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<CompletionRelay>,
}

impl AppState {
    pub fn new(relay: Arc<CompletionRelay>) -> Self {
        Self { relay }
    }
}

/// Health check handler
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Chat handler (POST /api/chat).
///
/// Streams the model answer as plain text. Any failure before the first chunk
/// is a bare 500; the cause is only logged.
pub async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", %request_id);

    async move {
        match start_chat(&state, &body).await {
            Ok(stream) => stream_response(stream),
            Err(e) => {
                error!("Error processing chat request: {}", e);
                internal_error()
            }
        }
    }
    .instrument(span)
    .await
}

async fn start_chat(state: &AppState, body: &[u8]) -> Result<StreamingResponse> {
    let req: ChatRequest = serde_json::from_slice(body)
        .map_err(|e| FolioRagError::ClientRequestInvalid(format!("invalid chat body: {e}")))?;
    info!("POST /api/chat: {} messages", req.messages.len());

    state.relay.converse(&req.messages).await
}

fn stream_response(stream: StreamingResponse) -> Response {
    let span = tracing::Span::current();
    let body = stream.into_stream().map(move |chunk| {
        chunk
            .map(|c| Bytes::from(c.into_string()))
            .inspect_err(|e| span.in_scope(|| error!("Completion stream aborted: {}", e)))
    });

    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(body),
    )
        .into_response()
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "Internal Server Error",
    )
        .into_response()
}
