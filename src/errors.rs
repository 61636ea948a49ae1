use thiserror::Error;

#[derive(Error, Debug)]
pub enum FolioRagError {
    /// Embedding service, document store or completion service could not be
    /// reached, or answered with a non-success status.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// An upstream answered, but without the fields we need.
    #[error("Malformed upstream response: {0}")]
    MalformedUpstreamResponse(String),

    /// The inbound chat request is absent, malformed or has no user turn.
    #[error("Invalid client request: {0}")]
    ClientRequestInvalid(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration source error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FolioRagError {
    /// Wrap a transport-level reqwest failure for the named upstream.
    pub(crate) fn upstream(service: &str, err: &reqwest::Error) -> Self {
        Self::UpstreamUnavailable(format!("{service}: {err}"))
    }

    /// True for failures caused by one of the three external services.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamUnavailable(_) | Self::MalformedUpstreamResponse(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FolioRagError>;
