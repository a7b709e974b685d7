//! Search service - the client surface of the external search engine.
//!
//! Everything the sync layer needs from the search engine goes through the
//! `SearchService` trait: list API keys, upsert or delete documents in a
//! named index, and mint tenant tokens.
//!
//! ## Implementations
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                   SearchService                         │
//! │  list_keys / add_documents / delete_document /          │
//! │  generate_tenant_token                                  │
//! └────────────────────────────────────────────────────────┘
//!            │                              │
//!            ▼                              ▼
//! ┌─────────────────────┐      ┌──────────────────────────┐
//! │ HttpSearchClient    │      │ InMemorySearchService    │
//! │ (feature "http")    │      │ (records every call)     │
//! └─────────────────────┘      └──────────────────────────┘
//! ```

#[cfg(feature = "http")]
mod http;
mod in_memory;
pub mod tenant_token;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "http")]
pub use http::HttpSearchClient;
pub use in_memory::{InMemorySearchService, Operation, SearchCall};

/// Per-index rules embedded in a tenant token, keyed by index name.
///
/// An empty object grants every row of the index; `{"filter": "..."}`
/// restricts it to rows matching the filter expression.
pub type SearchRules = BTreeMap<String, Value>;

/// Error type for search service calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The service answered with an error status.
    #[error("search service returned {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },
    /// The request never got a response (connection refused, DNS, TLS...).
    #[error("search service unreachable: {0}")]
    Transport(String),
    /// The response body could not be decoded.
    #[error("unexpected search service response: {0}")]
    Decode(String),
    /// A tenant token could not be produced from the given inputs.
    #[error("cannot generate tenant token: {0}")]
    TenantToken(String),
}

/// An API key as listed by the search service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub uid: String,
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default)]
    pub indexes: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl ApiKey {
    pub fn new(uid: impl Into<String>, key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            key: key.into(),
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// One page of API keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeysResults {
    pub results: Vec<ApiKey>,
    #[serde(default)]
    pub offset: u64,
    #[serde(default)]
    pub limit: u64,
    #[serde(default)]
    pub total: u64,
}

/// Summary of an asynchronous task enqueued by a write.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub task_uid: u64,
    #[serde(default)]
    pub index_uid: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
    #[serde(default)]
    pub enqueued_at: String,
}

/// Options for minting a tenant token.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TenantTokenOptions {
    /// Key used to sign the token. Falls back to the client's own key when empty.
    pub api_key: Option<String>,
    /// Absolute expiry; `None` means the token never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl TenantTokenOptions {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            expires_at: None,
        }
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}

/// Client interface to the search engine.
pub trait SearchService: Send + Sync {
    /// List API keys. Only the first page the service returns is read.
    fn list_keys(&self) -> Result<KeysResults, SearchError>;

    /// Add or fully replace documents in `index`.
    fn add_documents(
        &self,
        index: &str,
        documents: &[Value],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo, SearchError>;

    /// Delete one document by primary key.
    fn delete_document(&self, index: &str, id: &str) -> Result<TaskInfo, SearchError>;

    /// Mint a signed token restricting searches to `rules`.
    fn generate_tenant_token(
        &self,
        api_key_uid: &str,
        rules: &SearchRules,
        options: &TenantTokenOptions,
    ) -> Result<String, SearchError>;
}

impl<T: SearchService + ?Sized> SearchService for Arc<T> {
    fn list_keys(&self) -> Result<KeysResults, SearchError> {
        (**self).list_keys()
    }

    fn add_documents(
        &self,
        index: &str,
        documents: &[Value],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo, SearchError> {
        (**self).add_documents(index, documents, primary_key)
    }

    fn delete_document(&self, index: &str, id: &str) -> Result<TaskInfo, SearchError> {
        (**self).delete_document(index, id)
    }

    fn generate_tenant_token(
        &self,
        api_key_uid: &str,
        rules: &SearchRules,
        options: &TenantTokenOptions,
    ) -> Result<String, SearchError> {
        (**self).generate_tenant_token(api_key_uid, rules, options)
    }
}
