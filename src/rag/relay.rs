//! Completion relay: Embed -> Retrieve -> Ground -> Stream

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use tracing::info;

use super::RetrievalContext;
use super::Retriever;
use crate::embeddings::Embedder;
use crate::errors::FolioRagError;
use crate::errors::Result;
use crate::llm::prompts::PortfolioPrompts;
use crate::llm::CompletionService;
use crate::llm::PromptTemplate;
use crate::llm::StreamingResponse;
use crate::models::latest_user_turn;
use crate::models::ConversationTurn;

/// Conversation as sent to the model: one synthesized system turn followed by
/// the caller's turns, unchanged and in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroundedPrompt {
    turns: Vec<ConversationTurn>,
}

impl GroundedPrompt {
    pub fn new(system_content: String, history: &[ConversationTurn]) -> Self {
        let mut turns = Vec::with_capacity(history.len() + 1);
        turns.push(ConversationTurn::system(system_content));
        turns.extend_from_slice(history);
        Self { turns }
    }

    #[must_use]
    pub fn system_turn(&self) -> &ConversationTurn {
        &self.turns[0]
    }

    #[must_use]
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Answers a conversation with a model stream grounded in retrieved documents.
///
/// Holds long-lived service handles only; every call builds its own vector,
/// context and prompt, so one relay serves concurrent requests.
pub struct CompletionRelay {
    embedder: Arc<dyn Embedder>,
    retriever: Retriever,
    completion: Arc<dyn CompletionService>,
    owner: String,
    system_template: PromptTemplate,
}

impl CompletionRelay {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        retriever: Retriever,
        completion: Arc<dyn CompletionService>,
        owner: impl Into<String>,
    ) -> Self {
        Self {
            embedder,
            retriever,
            completion,
            owner: owner.into(),
            system_template: PortfolioPrompts::grounded_system(),
        }
    }

    /// Name the assistant answers as
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Embed the latest user turn, retrieve context and build the prompt.
    ///
    /// # Errors
    /// - `ClientRequestInvalid` for an empty conversation or one without a
    ///   user turn
    /// - embedding or store failures, unchanged
    pub async fn prepare(&self, history: &[ConversationTurn]) -> Result<GroundedPrompt> {
        let query = Self::query_turn(history)?;
        debug!("Step 1: Embedding latest user turn ({} chars)", query.content.len());
        let vector = self.embedder.embed(&query.content).await?;

        debug!("Step 2: Retrieving documents");
        let context = self.retriever.retrieve(&vector).await?;

        debug!("Step 3: Building grounded prompt");
        Ok(self.ground(&context, history))
    }

    /// Full relay pass. The returned stream is the model's, forwarded chunk by
    /// chunk.
    ///
    /// # Errors
    /// Anything [`prepare`](Self::prepare) returns, plus completion service
    /// failures before the stream starts.
    pub async fn converse(&self, history: &[ConversationTurn]) -> Result<StreamingResponse> {
        let prompt = self.prepare(history).await?;

        debug!("Step 4: Streaming completion with {} messages", prompt.len());
        let stream = self.completion.stream_chat(prompt.turns()).await?;

        info!("Completion stream started ({} turns of history)", history.len());
        Ok(stream)
    }

    /// Synthesize the system turn for `context` and put it in front of the
    /// conversation
    pub fn ground(
        &self,
        context: &RetrievalContext,
        history: &[ConversationTurn],
    ) -> GroundedPrompt {
        let rendered = context.render();
        let values = HashMap::from([
            ("owner", self.owner.as_str()),
            ("context", rendered.as_str()),
        ]);
        GroundedPrompt::new(self.system_template.render(&values), history)
    }

    fn query_turn(history: &[ConversationTurn]) -> Result<&ConversationTurn> {
        if history.is_empty() {
            return Err(FolioRagError::ClientRequestInvalid(
                "conversation has no messages".to_string(),
            ));
        }
        latest_user_turn(history).ok_or_else(|| {
            FolioRagError::ClientRequestInvalid("conversation has no user turn".to_string())
        })
    }
}
