//! Context assembly from retrieved documents

use crate::models::RetrievedDocument;

pub const CONTEXT_START: &str = "START CONTEXT";
pub const CONTEXT_END: &str = "END CONTEXT";

/// Ranked documents retrieved for one question, most similar first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrievalContext {
    documents: Vec<RetrievedDocument>,
}

impl RetrievalContext {
    /// Keep at most `limit` documents, in the order given
    pub fn new(mut documents: Vec<RetrievedDocument>, limit: usize) -> Self {
        documents.truncate(limit);
        Self { documents }
    }

    #[must_use]
    pub fn documents(&self) -> &[RetrievedDocument] {
        &self.documents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// One description per line, in ranked order. A document without a
    /// description contributes an empty line.
    #[must_use]
    pub fn body(&self) -> String {
        self.documents
            .iter()
            .map(|doc| doc.description.as_deref().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// The body wrapped in the start/end markers. An empty context still
    /// renders both markers.
    #[must_use]
    pub fn render(&self) -> String {
        format!("{CONTEXT_START}\n{}\n{CONTEXT_END}", self.body())
    }
}
