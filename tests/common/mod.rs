//! Deterministic stand-ins for the three external services

#![allow(dead_code)]

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use foliorag::embeddings::Embedder;
use foliorag::llm::CompletionService;
use foliorag::llm::StreamingResponse;
use foliorag::models::ConversationTurn;
use foliorag::models::EmbeddingVector;
use foliorag::models::RetrievedDocument;
use foliorag::models::StreamChunk;
use foliorag::rag::CompletionRelay;
use foliorag::rag::Retriever;
use foliorag::store::DocumentStore;
use foliorag::FolioRagError;
use foliorag::Result;

pub const OWNER: &str = "Adesh Rai";

/// Embedder returning a fixed vector, or always failing
#[derive(Default)]
pub struct FakeEmbedder {
    fail: bool,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl FakeEmbedder {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(FolioRagError::UpstreamUnavailable("embeddings: 503".to_string()));
        }
        Ok(vec![0.1, 0.2, 0.3])
    }
}

/// Store returning its documents in the given order, honouring the limit
/// unless `ignore_limit` is set
#[derive(Default)]
pub struct FakeStore {
    documents: Vec<RetrievedDocument>,
    fail: bool,
    ignore_limit: bool,
    calls: AtomicUsize,
    limits: Mutex<Vec<usize>>,
}

impl FakeStore {
    pub fn with_descriptions(descriptions: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            documents: descriptions
                .iter()
                .map(|d| RetrievedDocument::with_description(*d))
                .collect(),
            ..Self::default()
        })
    }

    /// Returns every document whatever the requested limit
    pub fn unbounded(descriptions: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            documents: descriptions
                .iter()
                .map(|d| RetrievedDocument::with_description(*d))
                .collect(),
            ignore_limit: true,
            ..Self::default()
        })
    }

    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn limits(&self) -> Vec<usize> {
        self.limits.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn find_similar(
        &self,
        _vector: &[f32],
        limit: usize,
    ) -> Result<Vec<RetrievedDocument>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.limits.lock().unwrap().push(limit);
        if self.fail {
            return Err(FolioRagError::UpstreamUnavailable("store: timeout".to_string()));
        }
        let take = if self.ignore_limit {
            self.documents.len()
        } else {
            limit
        };
        Ok(self.documents.iter().take(take).cloned().collect())
    }
}

/// Completion service that records every conversation it is given and answers
/// with fixed chunks
pub struct FakeCompletion {
    chunks: Vec<String>,
    fail_mid_stream: bool,
    requests: Mutex<Vec<Vec<ConversationTurn>>>,
}

impl FakeCompletion {
    pub fn answering(chunks: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            chunks: chunks.iter().map(|c| (*c).to_string()).collect(),
            fail_mid_stream: false,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Sends its chunks, then an error instead of a clean end
    pub fn aborting(chunks: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            chunks: chunks.iter().map(|c| (*c).to_string()).collect(),
            fail_mid_stream: true,
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<Vec<ConversationTurn>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Option<Vec<ConversationTurn>> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn stream_chat(&self, messages: &[ConversationTurn]) -> Result<StreamingResponse> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let mut chunks: Vec<Result<StreamChunk>> =
            self.chunks.iter().map(|c| Ok(StreamChunk::new(c.clone()))).collect();
        if self.fail_mid_stream {
            chunks.push(Err(FolioRagError::UpstreamUnavailable(
                "completion stream ended without [DONE]".to_string(),
            )));
        }
        Ok(StreamingResponse::from_chunks(chunks))
    }
}

/// Relay over the given fakes with the default retrieval limit
pub fn relay(
    embedder: Arc<FakeEmbedder>,
    store: Arc<FakeStore>,
    completion: Arc<FakeCompletion>,
) -> CompletionRelay {
    CompletionRelay::new(
        embedder,
        Retriever::new(store, foliorag::rag::DEFAULT_RETRIEVAL_LIMIT),
        completion,
        OWNER,
    )
}
