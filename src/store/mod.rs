//! Vector-indexed document store
//!
//! The relay talks to the store through [`DocumentStore`]. The production
//! implementation is a collection of an Astra DB database reached through its
//! JSON Data API ([`DataApiClient`] / [`Collection`]).

pub mod data_api;

use async_trait::async_trait;

pub use data_api::Collection;
pub use data_api::DataApiClient;

use crate::errors::Result;
use crate::models::RetrievedDocument;

/// A collection that can be searched by vector similarity
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents nearest to `vector`, most similar first, at most `limit`.
    /// No filter is applied: the whole collection is searched.
    async fn find_similar(&self, vector: &[f32], limit: usize) -> Result<Vec<RetrievedDocument>>;
}
