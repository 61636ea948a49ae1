use anyhow::Context;
use clap::Parser;
use foliorag::cli::Cli;
use foliorag::cli::Commands;
use foliorag::cli::{
    self,
};
use foliorag::config::AppConfig;
use foliorag::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration first
    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load_from(Some(path))
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => AppConfig::load().context("failed to load configuration")?,
    };

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    // The server logs to file too; one-shot commands keep stdout for output
    let _guard = if cli.command.is_long_running() {
        if cli.verbose {
            Some(logging::init_logging_with_level(level)?)
        } else {
            Some(logging::init_logging(&config)?)
        }
    } else {
        logging::init_simple_logging(level);
        None
    };

    if cli.command.needs_valid_config() {
        config.validate().context("invalid configuration")?;
    }

    match cli.command {
        Commands::Serve { host, port, cors } => {
            cli::handle_serve(&config, host, port, cors).await?;
        }
        Commands::Ask { question } => {
            cli::handle_ask(&config, question).await?;
        }
        Commands::Prompt { question } => {
            cli::handle_prompt(&config, question).await?;
        }
        Commands::Config => {
            cli::handle_config(&config)?;
        }
    }

    Ok(())
}
