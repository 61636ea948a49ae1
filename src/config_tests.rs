//! Unit tests for configuration module
//!
//! These tests validate configuration parsing, defaults, overrides and validation.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use crate::config::*;
    use crate::FolioRagError;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.store.endpoint = "https://db-id-us-east1.apps.astra.datastax.com".to_string();
        config.embeddings.api_key = "sk-test".to_string();
        config.llm.llm_key = "sk-test".to_string();
        config
    }

    // ====== Default Value Tests ======

    #[test]
    fn test_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.store.collection, "dataforchat");
        assert_eq!(config.store.retrieval_limit, 5);
        assert_eq!(config.embedding_model(), "text-embedding-3-small");
        assert_eq!(config.llm_model(), "gpt-3.5-turbo");
        assert_eq!(config.server.port, 3000);
    }

    // ====== File Loading Tests ======

    #[test]
    fn test_from_file_partial_sections() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[store]
endpoint = "https://example.apps.astra.datastax.com"
namespace = "portfolio"

[persona]
name = "Adesh Rai"
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.store.namespace, "portfolio");
        assert_eq!(config.store.collection, "dataforchat");
        assert_eq!(config.persona.name, "Adesh Rai");
        assert_eq!(config.llm_model(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[server\nport = ").unwrap();

        let result = AppConfig::from_file(file.path());
        assert!(matches!(result, Err(FolioRagError::TomlParsing(_))));
    }

    #[test]
    fn test_from_file_missing() {
        let result = AppConfig::from_file("/definitely/not/here/config.toml");
        assert!(matches!(result, Err(FolioRagError::Io(_))));
    }

    #[test]
    fn test_load_from_layers_file_over_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[store]
retrieval_limit = 3
"#
        )
        .unwrap();

        let config = AppConfig::load_from(Some(file.path())).unwrap();
        assert_eq!(config.server.port, 8088);
        assert_eq!(config.store.retrieval_limit, 3);
        assert_eq!(config.server.host, "127.0.0.1");
    }

    // ====== Override Tests ======

    #[test]
    fn test_env_variables_override_file_and_defaults() {
        // Own prefix so parallel tests reading FOLIORAG__* are unaffected
        const PREFIX: &str = "FOLIORAG_LAYER_TEST";
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 8088

[persona]
name = "Adesh Rai"
"#
        )
        .unwrap();

        std::env::set_var(format!("{PREFIX}__SERVER__PORT"), "8181");
        std::env::set_var(format!("{PREFIX}__STORE__RETRIEVAL_LIMIT"), "3");
        let config = AppConfig::load_layered(Some(file.path()), PREFIX);
        std::env::remove_var(format!("{PREFIX}__SERVER__PORT"));
        std::env::remove_var(format!("{PREFIX}__STORE__RETRIEVAL_LIMIT"));

        let config = config.unwrap();
        assert_eq!(config.server.port, 8181);
        assert_eq!(config.store.retrieval_limit, 3);
        assert_eq!(config.persona.name, "Adesh Rai");
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_apply_overrides_from_deployment_variables() {
        let vars: HashMap<&str, &str> = [
            (OPENAI_KEY_VAR, "sk-live"),
            (STORE_TOKEN_VAR, "AstraCS:token"),
            (STORE_ENDPOINT_VAR, "https://db.apps.astra.datastax.com"),
            (STORE_NAMESPACE_VAR, "portfolio"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.embeddings.api_key, "sk-live");
        assert_eq!(config.llm.llm_key, "sk-live");
        assert_eq!(config.store.token, "AstraCS:token");
        assert_eq!(config.store.endpoint, "https://db.apps.astra.datastax.com");
        assert_eq!(config.store.namespace, "portfolio");
    }

    #[test]
    fn test_apply_overrides_ignores_empty_values() {
        let mut config = valid_config();
        config.apply_overrides(|_| Some(String::new()));
        assert_eq!(config.embeddings.api_key, "sk-test");
        assert_eq!(config.store.namespace, "default_keyspace");
    }

    // ====== Validation Tests ======

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_requires_store_endpoint() {
        let config = AppConfig::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, FolioRagError::ConfigError(_)));
        assert!(err.to_string().contains(STORE_ENDPOINT_VAR));
    }

    #[test]
    fn test_validate_rejects_non_url_endpoint() {
        let mut config = valid_config();
        config.llm.llm_endpoint = "not a url".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("llm.llm_endpoint"));
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = valid_config();
        config.store.retrieval_limit = 0;
        assert!(config.validate().is_err());
    }

    // ====== Redaction Tests ======

    #[test]
    fn test_redacted_hides_secrets() {
        let mut config = valid_config();
        config.store.token = "AstraCS:secret".to_string();

        let redacted = config.redacted();
        assert_eq!(redacted.embeddings.api_key, "***");
        assert_eq!(redacted.llm.llm_key, "***");
        assert_eq!(redacted.store.token, "***");
        assert_eq!(redacted.store.endpoint, config.store.endpoint);

        let empty = AppConfig::default().redacted();
        assert!(empty.store.token.is_empty());
    }
}
