//! Streaming response handling
//!
//! Completion services answer with a server-sent event stream. [`SseDecoder`]
//! turns the raw body bytes into event payloads; [`StreamingResponse`] is what
//! the relay hands to its caller.

use std::pin::Pin;

use futures::channel::mpsc;
use futures::Stream;
use futures::StreamExt;

use crate::errors::Result;
use crate::models::StreamChunk;

/// Boxed stream of model output fragments
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk>> + Send>>;

/// Streaming response from LLM
pub struct StreamingResponse {
    stream: ChunkStream,
}

impl StreamingResponse {
    pub fn new(stream: ChunkStream) -> Self {
        Self { stream }
    }

    /// Consumer side of a producer/consumer channel. The stream ends when the
    /// producer drops its sender.
    pub fn from_channel(receiver: mpsc::Receiver<Result<StreamChunk>>) -> Self {
        Self::new(Box::pin(receiver))
    }

    /// A stream over already known chunks
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Result<StreamChunk>>,
        I::IntoIter: Send + 'static,
    {
        Self::new(Box::pin(futures::stream::iter(chunks)))
    }

    /// Collect all chunks into a single string
    pub async fn collect_all(mut self) -> Result<String> {
        let mut result = String::new();
        while let Some(chunk) = self.stream.next().await {
            result.push_str(chunk?.as_str());
        }
        Ok(result)
    }

    /// Get the underlying stream
    pub fn into_stream(self) -> ChunkStream {
        self.stream
    }
}

/// One decoded server-sent event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of a `data:` field
    Data(String),
    /// The `[DONE]` sentinel that closes an OpenAI-style stream
    Done,
}

const DONE_SENTINEL: &str = "[DONE]";

/// Incremental decoder for `text/event-stream` bodies.
///
/// Bytes are buffered until a full line is available, so multi-byte UTF-8
/// characters and lines split across network chunks decode correctly.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk, returning every event completed by it
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut start = 0;
        while let Some(len) = self.buffer[start..].iter().position(|&b| b == b'\n') {
            let end = start + len + 1;
            if let Some(event) = Self::decode_line(&self.buffer[start..end]) {
                events.push(event);
            }
            start = end;
        }
        self.buffer.drain(..start);
        events
    }

    /// Decode whatever is left once the body has ended without a final newline
    pub fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        Self::decode_line(&rest)
    }

    fn decode_line(line: &[u8]) -> Option<SseEvent> {
        let line = String::from_utf8_lossy(line);
        let line = line.trim_end_matches(['\n', '\r']);

        // Blank lines separate events, `:` lines are comments/keep-alives
        let payload = line.strip_prefix("data:")?;
        let payload = payload.strip_prefix(' ').unwrap_or(payload);

        if payload.trim() == DONE_SENTINEL {
            Some(SseEvent::Done)
        } else {
            Some(SseEvent::Data(payload.to_string()))
        }
    }
}
