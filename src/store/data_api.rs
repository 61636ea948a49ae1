//! Astra DB Data API client
//!
//! Only the `find` command with a `$vector` sort is needed here.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use super::DocumentStore;
use crate::config::AppConfig;
use crate::errors::FolioRagError;
use crate::errors::Result;
use crate::models::RetrievedDocument;

const SERVICE: &str = "document store";
const API_PATH: [&str; 3] = ["api", "json", "v1"];

/// Connection to one database/namespace; hands out [`Collection`] handles
#[derive(Clone)]
pub struct DataApiClient {
    endpoint: Url,
    namespace: String,
    token: String,
    client: Client,
}

impl DataApiClient {
    pub fn new(
        endpoint: &str,
        token: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            FolioRagError::ConfigError(format!("invalid document store endpoint {endpoint}: {e}"))
        })?;
        if endpoint.cannot_be_a_base() {
            return Err(FolioRagError::ConfigError(format!(
                "document store endpoint {endpoint} cannot carry a path"
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| FolioRagError::ConfigError(format!("document store HTTP client: {e}")))?;

        Ok(Self {
            endpoint,
            namespace: namespace.into(),
            token: token.into(),
            client,
        })
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        Self::new(
            &config.store.endpoint,
            config.store.token.clone(),
            config.store.namespace.clone(),
        )
    }

    /// Handle to a named collection in this namespace
    pub fn collection(&self, name: &str) -> Result<Collection> {
        if name.trim().is_empty() {
            return Err(FolioRagError::ConfigError(
                "collection name must not be empty".to_string(),
            ));
        }

        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|()| {
                FolioRagError::ConfigError(format!(
                    "cannot address collection {name} under {}",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .extend(API_PATH)
            .push(&self.namespace)
            .push(name);

        Ok(Collection {
            name: name.to_string(),
            url,
            token: self.token.clone(),
            client: self.client.clone(),
        })
    }
}

/// A single collection, addressed by URL
#[derive(Clone)]
pub struct Collection {
    name: String,
    url: Url,
    token: String,
    client: Client,
}

#[derive(Serialize)]
struct FindCommand<'a> {
    find: FindBody<'a>,
}

#[derive(Serialize)]
struct FindBody<'a> {
    filter: serde_json::Value,
    sort: VectorSort<'a>,
    options: FindOptions,
}

#[derive(Serialize)]
struct VectorSort<'a> {
    #[serde(rename = "$vector")]
    vector: &'a [f32],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FindOptions {
    limit: usize,
    include_similarity: bool,
}

#[derive(Deserialize)]
struct FindResponse {
    #[serde(default)]
    data: Option<FindData>,
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Deserialize)]
struct FindData {
    documents: Vec<RetrievedDocument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error_code: Option<String>,
}

impl Collection {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    fn find_command(vector: &[f32], limit: usize) -> FindCommand<'_> {
        FindCommand {
            find: FindBody {
                filter: json!({}),
                sort: VectorSort { vector },
                options: FindOptions {
                    limit,
                    include_similarity: true,
                },
            },
        }
    }

    fn parse_find_response(body: &str) -> Result<Vec<RetrievedDocument>> {
        let response: FindResponse = serde_json::from_str(body).map_err(|e| {
            FolioRagError::MalformedUpstreamResponse(format!(
                "{SERVICE}: failed to parse response: {e}"
            ))
        })?;

        if let Some(error) = response.errors.first() {
            return Err(FolioRagError::UpstreamUnavailable(format!(
                "{SERVICE} rejected query ({}): {}",
                error.error_code.as_deref().unwrap_or("UNKNOWN"),
                error.message
            )));
        }

        response.data.map(|data| data.documents).ok_or_else(|| {
            FolioRagError::MalformedUpstreamResponse(format!(
                "{SERVICE}: no documents in response"
            ))
        })
    }
}

#[async_trait]
impl DocumentStore for Collection {
    async fn find_similar(&self, vector: &[f32], limit: usize) -> Result<Vec<RetrievedDocument>> {
        debug!(
            "Querying collection {} for {} nearest documents ({} dims)",
            self.name,
            limit,
            vector.len()
        );

        let response = self
            .client
            .post(self.url.clone())
            .header("Token", &self.token)
            .json(&Self::find_command(vector, limit))
            .send()
            .await
            .map_err(|e| FolioRagError::upstream(SERVICE, &e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FolioRagError::upstream(SERVICE, &e))?;

        if !status.is_success() {
            return Err(FolioRagError::UpstreamUnavailable(format!(
                "{SERVICE} API error ({status}): {body}"
            )));
        }

        Self::parse_find_response(&body)
    }
}
