//! Command handlers

use std::io::Write;

use futures::StreamExt;

use crate::api::serve_api;
use crate::cli::output::*;
use crate::models::ConversationTurn;
use crate::rag::CompletionRelay;
use crate::AppConfig;
use crate::Result;

/// Start the API server; CLI flags take priority over configuration
pub async fn handle_serve(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = cors || config.server.enable_cors;

    println!("🚀 Starting foliorag API Server");
    println!("===============================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!();

    serve_api(config, host, port, cors).await
}

/// Answer one question, writing chunks to stdout as they arrive
pub async fn handle_ask(config: &AppConfig, question: String) -> Result<()> {
    let relay = CompletionRelay::from_app_config(config)?;
    print_info(&format!("Asking {}: {}", relay.owner(), truncate_str(&question, 80)));

    let history = [ConversationTurn::user(question)];
    let mut stream = relay.converse(&history).await?.into_stream();

    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        match chunk {
            Ok(chunk) => {
                stdout.write_all(chunk.as_str().as_bytes())?;
                stdout.flush()?;
            }
            Err(e) => {
                println!();
                print_error(&format!("Answer stream aborted: {e}"));
                return Err(e);
            }
        }
    }
    println!();
    print_success("Done");
    Ok(())
}

/// Show the prompt a question would be answered with, without calling the
/// completion service
pub async fn handle_prompt(config: &AppConfig, question: String) -> Result<()> {
    let relay = CompletionRelay::from_app_config(config)?;
    let prompt = relay.prepare(&[ConversationTurn::user(question)]).await?;
    print_grounded_prompt(&prompt);
    Ok(())
}

/// Print the effective configuration with secrets masked
pub fn handle_config(config: &AppConfig) -> Result<()> {
    print_config(&config.redacted());
    Ok(())
}
