//! Tenant token issuing.
//!
//! Every user gets the same shape of rules: unrestricted search on the
//! cities index, and trails limited to public ones plus the user's own.
//! The signing key is resolved once and cached; `refresh_key` re-resolves it.

use std::sync::{Arc, PoisonError, RwLock};

use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::index::TRAILS_INDEX;
use crate::keys::{resolve_key_by_name, KeyError, ResolvedKey};
use crate::record::{Record, RecordError, RecordStore};
use crate::search::{SearchError, SearchRules, SearchService, TenantTokenOptions};

pub const CITIES_INDEX: &str = "cities500";

/// Field of the user record that receives the token.
pub const TOKEN_FIELD: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Filter restricting trails to public ones and those authored by `user_id`.
pub fn trail_filter(user_id: &str) -> String {
    format!("public = true OR author = {}", user_id)
}

pub fn search_rules(user_id: &str) -> SearchRules {
    let mut rules = SearchRules::new();
    rules.insert(CITIES_INDEX.to_string(), Value::Object(Default::default()));
    rules.insert(
        TRAILS_INDEX.to_string(),
        json!({ "filter": trail_filter(user_id) }),
    );
    rules
}

/// Mint a token for `user_id` signed with the given key.
pub fn issue_token(
    search: &dyn SearchService,
    user_id: &str,
    api_key_uid: &str,
    api_key: &str,
    ttl: Option<Duration>,
) -> Result<String, SearchError> {
    let mut options = TenantTokenOptions::with_api_key(api_key);
    if let Some(ttl) = ttl {
        let expires_at = Utc::now().checked_add_signed(ttl).ok_or_else(|| {
            SearchError::TenantToken(format!("token lifetime {ttl} is out of range"))
        })?;
        options = options.expires_at(expires_at);
    }
    search.generate_tenant_token(api_key_uid, &search_rules(user_id), &options)
}

pub struct TokenIssuer {
    search: Arc<dyn SearchService>,
    key_name: String,
    key: RwLock<ResolvedKey>,
    ttl: Option<Duration>,
}

impl TokenIssuer {
    pub fn new(
        search: Arc<dyn SearchService>,
        key_name: impl Into<String>,
        key: ResolvedKey,
    ) -> Self {
        Self {
            search,
            key_name: key_name.into(),
            key: RwLock::new(key),
            ttl: None,
        }
    }

    /// Resolve the key named `key_name` and build an issuer around it.
    pub fn resolve(
        search: Arc<dyn SearchService>,
        key_name: impl Into<String>,
    ) -> Result<Self, KeyError> {
        let key_name = key_name.into();
        let key = resolve_key_by_name(search.as_ref(), &key_name)?;
        Ok(Self::new(search, key_name, key))
    }

    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn key(&self) -> ResolvedKey {
        self.key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look the key up again and replace the cached one.
    ///
    /// On failure the previous key stays in place.
    pub fn refresh_key(&self) -> Result<ResolvedKey, KeyError> {
        let key = resolve_key_by_name(self.search.as_ref(), &self.key_name)?;
        *self.key.write().unwrap_or_else(PoisonError::into_inner) = key.clone();
        info!(name = %self.key_name, uid = %key.uid, "refreshed search api key");
        Ok(key)
    }

    pub fn issue_token(&self, user_id: &str) -> Result<String, SearchError> {
        let key = self.key();
        debug!(user_id, key_uid = %key.uid, "issuing tenant token");
        issue_token(self.search.as_ref(), user_id, &key.uid, &key.key, self.ttl)
    }

    /// Issue a token for the user `record`, store it on the record and save.
    pub fn issue_for_record<S: RecordStore + ?Sized>(
        &self,
        record: &mut Record,
        store: &S,
    ) -> Result<String, TokenError> {
        let token = self.issue_token(record.id())?;
        record.set(TOKEN_FIELD, token.clone());
        store.save_record(record)?;
        Ok(token)
    }
}
