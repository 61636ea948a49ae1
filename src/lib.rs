//! Retrieval-augmented chat relay for a portfolio site.
//!
//! A conversation comes in, the latest user turn is embedded, the nearest
//! portfolio documents are fetched from the document store and spliced into a
//! system turn, and the model's answer is streamed back.

pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod store;

#[cfg(test)]
mod config_tests;

pub use config::AppConfig;
pub use errors::*;
