//! Language model access
//!
//! [`CompletionService`] is the seam the relay streams through;
//! [`ChatClient`] implements it against an OpenAI-compatible
//! `/chat/completions` endpoint.

pub mod client;
pub mod prompts;
pub mod streaming;

use async_trait::async_trait;

pub use client::ChatClient;
pub use prompts::PromptTemplate;
pub use streaming::StreamingResponse;

use crate::errors::Result;
use crate::models::ConversationTurn;

/// A chat model that answers with a token stream
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Start a streaming completion for `messages`.
    ///
    /// Resolves once the service has accepted the request; failures before
    /// that point are returned as `Err`. Later failures arrive as an `Err`
    /// item that ends the stream.
    async fn stream_chat(&self, messages: &[ConversationTurn]) -> Result<StreamingResponse>;
}
