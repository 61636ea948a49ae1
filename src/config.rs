use std::path::Path;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;
use tracing::warn;
use url::Url;

/// Prefix for layered environment overrides, e.g. `FOLIORAG__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "FOLIORAG";

/// Credential shared by the embedding and completion services.
pub const OPENAI_KEY_VAR: &str = "OPENAI_KEY";
pub const STORE_TOKEN_VAR: &str = "ASTRA_DB_APPLICATION_TOKEN";
pub const STORE_ENDPOINT_VAR: &str = "ASTRA_DB_API_ENDPOINT";
pub const STORE_NAMESPACE_VAR: &str = "ASTRA_DB_NAMESPACE";

const REDACTED: &str = "***";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_enable_cors() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_openai_endpoint")]
    pub llm_endpoint: String,
    #[serde(default)]
    pub llm_key: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Data API endpoint of the database, e.g. `https://<id>-<region>.apps.astra.datastax.com`
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub token: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default = "default_retrieval_limit")]
    pub retrieval_limit: usize,
}

fn default_namespace() -> String {
    "default_keyspace".to_string()
}

fn default_collection() -> String {
    "dataforchat".to_string()
}

fn default_retrieval_limit() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    /// Name the assistant speaks as
    #[serde(default = "default_persona_name")]
    pub name: String,
}

fn default_persona_name() -> String {
    "the portfolio owner".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    pub store: StoreConfig,
    pub persona: PersonaConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from the default config file path, then apply
    /// environment overrides
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::load_from(Some(Path::new("config.toml")))
        } else if Path::new("config.example.toml").exists() {
            warn!("Using config.example.toml. Please create config.toml for production use.");
            Self::load_from(Some(Path::new("config.example.toml")))
        } else {
            Self::load_from(None)
        }
    }

    /// Layer defaults, an optional file, `FOLIORAG__*` variables and the
    /// well-known deployment variables, in that order.
    pub fn load_from(path: Option<&Path>) -> crate::Result<Self> {
        Self::load_layered(path, ENV_PREFIX)
    }

    pub(crate) fn load_layered(path: Option<&Path>, env_prefix: &str) -> crate::Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("__")
                .separator("__"),
        );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply the well-known provider variables (`OPENAI_KEY`, `ASTRA_DB_*`).
    /// `lookup` is `std::env::var` in production.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        if let Some(key) = lookup(OPENAI_KEY_VAR) {
            self.embeddings.api_key.clone_from(&key);
            self.llm.llm_key = key;
        }
        if let Some(token) = lookup(STORE_TOKEN_VAR) {
            self.store.token = token;
        }
        if let Some(endpoint) = lookup(STORE_ENDPOINT_VAR) {
            self.store.endpoint = endpoint;
        }
        if let Some(namespace) = lookup(STORE_NAMESPACE_VAR) {
            self.store.namespace = namespace;
        }
    }

    /// Check the settings the relay cannot start without
    pub fn validate(&self) -> crate::Result<()> {
        if self.store.endpoint.trim().is_empty() {
            return Err(crate::FolioRagError::ConfigError(format!(
                "document store endpoint is not set (store.endpoint or {STORE_ENDPOINT_VAR})"
            )));
        }
        for (name, value) in [
            ("store.endpoint", &self.store.endpoint),
            ("embeddings.endpoint", &self.embeddings.endpoint),
            ("llm.llm_endpoint", &self.llm.llm_endpoint),
        ] {
            Url::parse(value).map_err(|e| {
                crate::FolioRagError::ConfigError(format!(
                    "{name} is not a valid URL ({value}): {e}"
                ))
            })?;
        }
        if self.store.retrieval_limit == 0 {
            return Err(crate::FolioRagError::ConfigError(
                "store.retrieval_limit must be at least 1".to_string(),
            ));
        }
        if self.store.collection.trim().is_empty() || self.store.namespace.trim().is_empty() {
            return Err(crate::FolioRagError::ConfigError(
                "store.namespace and store.collection must not be empty".to_string(),
            ));
        }
        if self.embeddings.api_key.is_empty() || self.llm.llm_key.is_empty() {
            warn!("No API key configured for the embedding or completion service");
        }
        Ok(())
    }

    /// Copy of the configuration that is safe to print
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for secret in [
            &mut config.embeddings.api_key,
            &mut config.llm.llm_key,
            &mut config.store.token,
        ] {
            if !secret.is_empty() {
                *secret = REDACTED.to_string();
            }
        }
        config
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.llm_endpoint
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.llm_model
    }

    /// Get the number of documents fetched per question
    pub fn retrieval_limit(&self) -> usize {
        self.store.retrieval_limit
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                enable_cors: default_enable_cors(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
            },
            embeddings: EmbeddingsConfig {
                endpoint: default_openai_endpoint(),
                api_key: String::new(),
                model: default_embedding_model(),
            },
            llm: LlmConfig {
                llm_endpoint: default_openai_endpoint(),
                llm_key: String::new(),
                llm_model: default_llm_model(),
            },
            store: StoreConfig {
                endpoint: String::new(),
                token: String::new(),
                namespace: default_namespace(),
                collection: default_collection(),
                retrieval_limit: default_retrieval_limit(),
            },
            persona: PersonaConfig {
                name: default_persona_name(),
            },
        }
    }
}
