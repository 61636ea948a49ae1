//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "foliorag")]
#[command(about = "Retrieval-augmented chat relay for a portfolio site")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: configured level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat API server
    Serve {
        /// Host to bind to (default: server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: server.port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS
        #[arg(long)]
        cors: bool,
    },
    /// Ask one question and stream the answer to stdout
    Ask {
        /// The question
        question: String,
    },
    /// Print the grounded prompt a question would be answered with
    Prompt {
        /// The question
        question: String,
    },
    /// Show current configuration
    Config,
}

impl Commands {
    /// Long-running commands log to file as well as the console
    #[must_use]
    pub fn is_long_running(&self) -> bool {
        matches!(self, Self::Serve { .. })
    }

    /// Whether the command needs a usable relay configuration
    #[must_use]
    pub fn needs_valid_config(&self) -> bool {
        !matches!(self, Self::Config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from([
            "foliorag", "serve", "--host", "0.0.0.0", "-p", "8080", "--cors",
        ]);
        match cli.command {
            Commands::Serve { host, port, cors } => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert!(cors);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_global_flags() {
        let cli = Cli::parse_from(["foliorag", "-v", "ask", "What projects?", "-c", "other.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("other.toml")));
        assert!(matches!(
            cli.command,
            Commands::Ask { ref question } if question == "What projects?"
        ));
        assert!(cli.command.needs_valid_config());
        assert!(!cli.command.is_long_running());
    }

    #[test]
    fn test_verbose_after_subcommand() {
        let cli = Cli::parse_from(["foliorag", "serve", "-v", "-c", "x.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[test]
    fn test_config_command_skips_validation() {
        let cli = Cli::parse_from(["foliorag", "config"]);
        assert!(!cli.command.needs_valid_config());
    }
}
