//! App: the record request path with the sync hooks attached.
//!
//! `App` plays the part of the record framework's request handlers: each
//! write persists the record, then fires the matching after-hooks. A hook
//! error fails the request even though the write already happened; the
//! record store and the search index are not updated atomically.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trail_search::{App, Config, HttpSearchClient, InMemoryRecordStore, Record};
//!
//! let config = Config::from_env()?;
//! let search = Arc::new(HttpSearchClient::from_config(&config)?);
//! let app = App::bootstrap(InMemoryRecordStore::new(), search, &config)?;
//!
//! let mut user = Record::new("users");
//! user.set("username", "ada");
//! let user = app.create_record(user)?;
//! assert!(!user.get_string("token").is_empty());
//! ```

use std::sync::Arc;

use tracing::info;

use crate::config::Config;
use crate::hooks::{HookError, Hooks, Phase};
use crate::keys::KeyError;
use crate::record::{Record, RecordError, RecordStore};
use crate::search::SearchService;
use crate::token::TokenIssuer;
use crate::wiring::{register_sync_hooks, SyncState};

/// Startup failures. These are fatal for the process, unlike request errors.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),
    #[error("cannot resolve search api key: {0}")]
    Key(#[from] KeyError),
    #[error("cannot build search client: {0}")]
    Search(#[from] crate::search::SearchError),
}

pub struct App<S> {
    state: SyncState<S>,
    hooks: Hooks<SyncState<S>>,
}

impl<S: RecordStore + 'static> App<S> {
    /// Resolve the signing key once and wire the sync hooks.
    pub fn bootstrap(
        store: S,
        search: Arc<dyn SearchService>,
        config: &Config,
    ) -> Result<Self, BootstrapError> {
        let issuer = TokenIssuer::resolve(search.clone(), config.search_key_name.clone())?
            .with_ttl(config.token_ttl);
        info!(
            key_name = %config.search_key_name,
            key_uid = %issuer.key().uid,
            "search api key resolved"
        );
        Ok(Self::new(SyncState::new(store, search, issuer)))
    }

    /// Build an app from ready state, registering the sync hooks.
    pub fn new(state: SyncState<S>) -> Self {
        Self {
            state,
            hooks: register_sync_hooks(Hooks::new()),
        }
    }

    pub fn state(&self) -> &SyncState<S> {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.state.store
    }

    pub fn issuer(&self) -> &TokenIssuer {
        &self.state.issuer
    }

    pub fn hooks(&self) -> &Hooks<SyncState<S>> {
        &self.hooks
    }

    /// Insert a new record, then fire after-create hooks.
    ///
    /// Fails with `RecordError::AlreadyExists` when the id is taken.
    pub fn create_record(&self, mut record: Record) -> Result<Record, HookError> {
        if !record.id().is_empty()
            && self
                .state
                .store
                .find_record(record.collection(), record.id())?
                .is_some()
        {
            return Err(RecordError::AlreadyExists {
                collection: record.collection().to_string(),
                id: record.id().to_string(),
            }
            .into());
        }
        self.state.store.save_record(&mut record)?;
        self.hooks
            .fire(Phase::AfterCreate, &mut record, &self.state)?;
        Ok(record)
    }

    /// Replace an existing record, then fire after-update hooks.
    ///
    /// Fails with `RecordError::NotFound` when the record does not exist.
    pub fn update_record(&self, mut record: Record) -> Result<Record, HookError> {
        let existing = self
            .state
            .store
            .get_record(record.collection(), record.id())?;
        if record.get("created").is_none() {
            if let Some(created) = existing.get("created") {
                record.set("created", created.clone());
            }
        }
        self.state.store.save_record(&mut record)?;
        self.hooks
            .fire(Phase::AfterUpdate, &mut record, &self.state)?;
        Ok(record)
    }

    /// Delete a record, then fire after-delete hooks with its last version.
    pub fn delete_record(&self, collection: &str, id: &str) -> Result<Record, HookError> {
        let mut record = self.state.store.get_record(collection, id)?;
        self.state.store.delete_record(collection, id)?;
        self.hooks
            .fire(Phase::AfterDelete, &mut record, &self.state)?;
        Ok(record)
    }
}
