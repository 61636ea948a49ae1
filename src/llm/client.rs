//! OpenAI-compatible streaming chat completions client

use std::ops::ControlFlow;
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::mpsc;
use futures::SinkExt;
use futures::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::streaming::SseDecoder;
use super::streaming::SseEvent;
use super::CompletionService;
use super::StreamingResponse;
use crate::config::AppConfig;
use crate::errors::FolioRagError;
use crate::errors::Result;
use crate::models::ConversationTurn;
use crate::models::StreamChunk;

const SERVICE: &str = "completion";

/// Chunks buffered between the network reader and the HTTP response writer
const CHANNEL_CAPACITY: usize = 32;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: &'a [ConversationTurn],
}

#[derive(Deserialize)]
struct ChatStreamEvent {
    #[serde(default)]
    choices: Vec<ChatStreamChoice>,
}

#[derive(Deserialize)]
struct ChatStreamChoice {
    #[serde(default)]
    delta: ChatDelta,
}

#[derive(Deserialize, Default)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Text carried by one `data:` payload, if any. Role-only and finish events
/// carry none.
fn parse_delta(payload: &str) -> Result<Option<String>> {
    let event: ChatStreamEvent = serde_json::from_str(payload).map_err(|e| {
        FolioRagError::MalformedUpstreamResponse(format!("{SERVICE}: bad stream event: {e}"))
    })?;

    Ok(event
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

/// Client for the streaming `/chat/completions` endpoint
#[derive(Clone)]
pub struct ChatClient {
    model: String,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl ChatClient {
    /// Create a new chat client.
    ///
    /// Only the connection is bounded by a timeout; a streamed answer may
    /// legitimately take longer than any fixed total.
    pub fn new(model: String, endpoint: String, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FolioRagError::ConfigError(format!("completion HTTP client: {e}")))?;

        Ok(Self {
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let api_key = Some(config.llm.llm_key.clone()).filter(|key| !key.is_empty());
        Self::new(
            config.llm_model().to_string(),
            config.llm_endpoint().to_string(),
            api_key,
        )
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Forward one decoded event. `Break` ends the pump: `[DONE]`, a bad
/// payload, or a receiver that went away.
async fn forward_event(
    tx: &mut mpsc::Sender<Result<StreamChunk>>,
    event: SseEvent,
    forwarded: &mut usize,
) -> ControlFlow<()> {
    let payload = match event {
        SseEvent::Done => {
            debug!("Completion stream finished after {} chunks", forwarded);
            return ControlFlow::Break(());
        }
        SseEvent::Data(payload) => payload,
    };

    match parse_delta(&payload) {
        Ok(Some(text)) => {
            if tx.send(Ok(StreamChunk::new(text))).await.is_err() {
                debug!("Caller went away after {} chunks; stopping", forwarded);
                return ControlFlow::Break(());
            }
            *forwarded += 1;
            ControlFlow::Continue(())
        }
        Ok(None) => ControlFlow::Continue(()),
        Err(e) => {
            warn!("Dropping completion stream: {}", e);
            let _ = tx.send(Err(e)).await;
            ControlFlow::Break(())
        }
    }
}

/// Producer side: read the event stream and push text deltas into `tx`.
/// Dropping `tx` on return closes the consumer's stream.
async fn pump_events(response: reqwest::Response, mut tx: mpsc::Sender<Result<StreamChunk>>) {
    let mut body = response.bytes_stream();
    let mut decoder = SseDecoder::new();
    let mut forwarded = 0usize;

    while let Some(next) = body.next().await {
        let bytes = match next {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Completion stream interrupted after {} chunks: {}", forwarded, e);
                let _ = tx.send(Err(FolioRagError::upstream(SERVICE, &e))).await;
                return;
            }
        };

        for event in decoder.push(&bytes) {
            if forward_event(&mut tx, event, &mut forwarded).await.is_break() {
                return;
            }
        }
    }

    if let Some(event) = decoder.finish() {
        if forward_event(&mut tx, event, &mut forwarded).await.is_break() {
            return;
        }
    }

    warn!("Completion stream ended without a completion signal after {} chunks", forwarded);
    let _ = tx
        .send(Err(FolioRagError::UpstreamUnavailable(format!(
            "{SERVICE}: stream ended before [DONE]"
        ))))
        .await;
}

#[async_trait]
impl CompletionService for ChatClient {
    async fn stream_chat(&self, messages: &[ConversationTurn]) -> Result<StreamingResponse> {
        let url = format!("{}/chat/completions", self.endpoint);
        debug!(
            "Calling chat completions API: {} (model {}, {} messages)",
            url,
            self.model,
            messages.len()
        );

        let request = ChatRequest {
            model: &self.model,
            stream: true,
            messages,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| FolioRagError::upstream(SERVICE, &e))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FolioRagError::UpstreamUnavailable(format!(
                "{SERVICE} API error ({status}): {error_text}"
            )));
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(pump_events(response, tx));

        Ok(StreamingResponse::from_channel(rx))
    }
}
