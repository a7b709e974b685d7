//! HTTP client for a Meilisearch-compatible search service.
//!
//! Requires the `http` feature. Uses reqwest's blocking client, so calls
//! block the calling thread until the service answers.
//!
//! ## Endpoints
//!
//! - `GET /keys`: list API keys.
//! - `POST /indexes/:index/documents?primaryKey=:pk`: add or replace documents.
//! - `DELETE /indexes/:index/documents/:id`: delete one document.
//!
//! Tenant tokens are signed locally; the service is never contacted for them.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{
    tenant_token, KeysResults, SearchError, SearchRules, SearchService, TaskInfo,
    TenantTokenOptions,
};
use crate::config::Config;

/// Error body returned by the service on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: String,
}

pub struct HttpSearchClient {
    host: String,
    base: Url,
    master_key: Option<String>,
    http: Client,
}

impl HttpSearchClient {
    /// Build a client for `host`, authenticating with `master_key` when given.
    pub fn new(host: impl Into<String>, master_key: Option<String>) -> Result<Self, SearchError> {
        let host = host.into().trim_end_matches('/').to_string();
        let base = Url::parse(&host)
            .map_err(|e| SearchError::Transport(format!("invalid search url {host:?}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(SearchError::Transport(format!(
                "invalid search url {host:?}: not a base url"
            )));
        }
        let master_key = master_key.filter(|k| !k.is_empty());

        let mut headers = HeaderMap::new();
        if let Some(key) = &master_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key))
                .map_err(|e| SearchError::Transport(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        Ok(Self {
            host,
            base,
            master_key,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SearchError> {
        Self::new(config.search_url.clone(), config.master_key.clone())
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Endpoint URL with each segment percent-encoded under the base path.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SearchError> {
        let response = request
            .send()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SearchError::Transport(e.to_string()))?;

        if !status.is_success() {
            let (code, message) = match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(err) => (err.code, err.message),
                Err(_) => (String::new(), body),
            };
            return Err(SearchError::Api {
                status: status.as_u16(),
                code,
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| SearchError::Decode(e.to_string()))
    }
}

impl SearchService for HttpSearchClient {
    fn list_keys(&self) -> Result<KeysResults, SearchError> {
        debug!(host = %self.host, "listing search api keys");
        self.send(self.http.get(self.url(&["keys"])))
    }

    fn add_documents(
        &self,
        index: &str,
        documents: &[Value],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo, SearchError> {
        debug!(index, count = documents.len(), "adding documents");
        let mut request = self
            .http
            .post(self.url(&["indexes", index, "documents"]))
            .json(documents);
        if let Some(pk) = primary_key {
            request = request.query(&[("primaryKey", pk)]);
        }
        self.send(request)
    }

    fn delete_document(&self, index: &str, id: &str) -> Result<TaskInfo, SearchError> {
        debug!(index, id, "deleting document");
        self.send(self.http.delete(self.url(&["indexes", index, "documents", id])))
    }

    fn generate_tenant_token(
        &self,
        api_key_uid: &str,
        rules: &SearchRules,
        options: &TenantTokenOptions,
    ) -> Result<String, SearchError> {
        let signing_key = options
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .or(self.master_key.as_deref())
            .unwrap_or_default();
        tenant_token::sign(api_key_uid, rules, signing_key, options.expires_at)
    }
}
