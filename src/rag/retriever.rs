//! Retrieval of grounding documents by vector similarity

use std::sync::Arc;

use tracing::debug;

use super::RetrievalContext;
use crate::errors::Result;
use crate::store::DocumentStore;

/// Default number of documents injected into the prompt
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 5;

/// Fetches the documents nearest to a query vector
#[derive(Clone)]
pub struct Retriever {
    store: Arc<dyn DocumentStore>,
    limit: usize,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(store: Arc<dyn DocumentStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Ranked context for `vector` with the configured limit
    pub async fn retrieve(&self, vector: &[f32]) -> Result<RetrievalContext> {
        self.retrieve_with_limit(vector, self.limit).await
    }

    /// Ranked context for `vector`, at most `limit` documents. Zero matches is
    /// an empty context, not an error.
    pub async fn retrieve_with_limit(
        &self,
        vector: &[f32],
        limit: usize,
    ) -> Result<RetrievalContext> {
        let documents = self.store.find_similar(vector, limit).await?;
        if documents.len() > limit {
            debug!(
                "Store returned {} documents for limit {}; dropping the rest",
                documents.len(),
                limit
            );
        }

        let context = RetrievalContext::new(documents, limit);
        debug!("Retrieved {} documents", context.len());
        Ok(context)
    }
}
