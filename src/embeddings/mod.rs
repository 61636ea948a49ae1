//! Embeddings module
//!
//! Turns the visitor's latest message into a vector for the similarity query.
//! The relay only sees the [`Embedder`] trait; [`EmbeddingClient`] is the
//! OpenAI-compatible implementation wired up by the entry point.
//!
//! # Examples
//!
//! ```rust,no_run
//! use foliorag::config::AppConfig;
//! use foliorag::embeddings::{Embedder, EmbeddingClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let client = EmbeddingClient::from_app_config(&config)?;
//!
//!     let embedding = client.embed("What projects have you built?").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

use async_trait::async_trait;

pub use client::EmbeddingClient;

use crate::errors::Result;
use crate::models::EmbeddingVector;

/// Produces one embedding vector per piece of text
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text` as-is. No local validation is done; an empty string is
    /// sent to the service like any other.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector>;
}
