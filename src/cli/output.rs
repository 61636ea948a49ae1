//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `foliorag` CLI

use crate::models::Role;
use crate::rag::GroundedPrompt;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print configuration. Callers pass a redacted copy.
pub fn print_config(config: &AppConfig) {
    println!("📋 foliorag Configuration:");
    println!();

    println!("🌐 Server:");
    println!("  Address: {}:{}", config.server.host, config.server.port);
    println!("  CORS: {}", config.server.enable_cors);
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!();

    println!("🧠 Embeddings:");
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Model: {}", config.embedding_model());
    println!("  API key: {}", display_secret(&config.embeddings.api_key));
    println!();

    println!("🤖 LLM:");
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Model: {}", config.llm_model());
    println!("  API key: {}", display_secret(&config.llm.llm_key));
    println!();

    println!("🗄️  Document store:");
    println!("  Endpoint: {}", display_unset(&config.store.endpoint));
    println!("  Namespace: {}", config.store.namespace);
    println!("  Collection: {}", config.store.collection);
    println!("  Retrieval limit: {}", config.retrieval_limit());
    println!("  Token: {}", display_secret(&config.store.token));
    println!();

    println!("🙋 Persona: {}", config.persona.name);
}

fn display_secret(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

fn display_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// Print every turn of a grounded prompt, system turn first
pub fn print_grounded_prompt(prompt: &GroundedPrompt) {
    println!("🧾 Grounded prompt ({} messages):", prompt.len());
    for (i, turn) in prompt.turns().iter().enumerate() {
        let label = match turn.role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        println!();
        println!("── [{}] {} ──", i, label);
        println!("{}", turn.content);
    }
}

pub fn print_info(msg: &str) {
    eprintln!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    eprintln!("✅ {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str_multibyte() {
        assert_eq!(truncate_str("héllo wörld", 5), "héllo...");
        assert_eq!(truncate_str("short", 10), "short");
    }

    #[test]
    fn test_display_secret() {
        assert_eq!(display_secret(""), "(not set)");
        assert_eq!(display_secret("***"), "***");
    }
}
