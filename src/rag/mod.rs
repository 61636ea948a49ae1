//! RAG (Retrieval-Augmented Generation) module
//!
//! This module answers portfolio questions end to end:
//! - Semantic retrieval using vector embeddings
//! - Context assembly from retrieved documents
//! - Grounded prompt construction and streamed LLM answers
//!
//! # Examples
//!
//! ```rust,no_run
//! use foliorag::config::AppConfig;
//! use foliorag::models::ConversationTurn;
//! use foliorag::rag::CompletionRelay;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let relay = CompletionRelay::from_app_config(&config)?;
//!
//!     let history = vec![ConversationTurn::user("What projects have you built?")];
//!     let answer = relay.converse(&history).await?.collect_all().await?;
//!     println!("Answer: {answer}");
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod relay;
pub mod retriever;

use std::sync::Arc;

use tracing::info;

pub use context::RetrievalContext;
pub use relay::CompletionRelay;
pub use relay::GroundedPrompt;
pub use retriever::Retriever;
pub use retriever::DEFAULT_RETRIEVAL_LIMIT;

use crate::config::AppConfig;
use crate::embeddings::EmbeddingClient;
use crate::errors::Result;
use crate::llm::ChatClient;
use crate::store::DataApiClient;

impl CompletionRelay {
    /// Build the production relay: OpenAI-compatible embedding and chat
    /// clients and the configured Data API collection.
    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        let embedder = Arc::new(EmbeddingClient::from_app_config(config)?);
        let collection =
            DataApiClient::from_app_config(config)?.collection(&config.store.collection)?;
        let completion = Arc::new(ChatClient::from_app_config(config)?);
        info!(
            "Relay models: embeddings {}, completion {}; collection {}",
            embedder.model(),
            completion.model(),
            collection.name()
        );
        let retriever = Retriever::new(Arc::new(collection), config.retrieval_limit());

        Ok(Self::new(embedder, retriever, completion, config.persona.name.clone()))
    }
}
