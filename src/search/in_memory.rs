//! InMemorySearchService - a search service that lives in process.
//!
//! Keeps documents per index, serves a configurable key list, signs tenant
//! tokens the same way the HTTP client does, and records every call with its
//! arguments. Failures can be injected per operation to exercise error paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;

use super::{
    tenant_token, ApiKey, KeysResults, SearchError, SearchRules, SearchService, TaskInfo,
    TenantTokenOptions,
};

/// A call received by the service, with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchCall {
    ListKeys,
    AddDocuments {
        index: String,
        documents: Vec<Value>,
        primary_key: Option<String>,
    },
    DeleteDocument {
        index: String,
        id: String,
    },
    GenerateTenantToken {
        api_key_uid: String,
        rules: SearchRules,
        options: TenantTokenOptions,
    },
}

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListKeys,
    AddDocuments,
    DeleteDocument,
    GenerateTenantToken,
}

#[derive(Default)]
struct State {
    keys: Vec<ApiKey>,
    indexes: HashMap<String, BTreeMap<String, Value>>,
    calls: Vec<SearchCall>,
    failures: HashMap<Operation, SearchError>,
    next_task_uid: u64,
}

impl State {
    fn enqueue(&mut self, index: &str, task_type: &str) -> TaskInfo {
        let task_uid = self.next_task_uid;
        self.next_task_uid += 1;
        TaskInfo {
            task_uid,
            index_uid: Some(index.to_string()),
            status: "succeeded".to_string(),
            task_type: task_type.to_string(),
            enqueued_at: Utc::now().to_rfc3339(),
        }
    }

    fn check(&self, op: Operation) -> Result<(), SearchError> {
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// In-memory search service. Clone-friendly via Arc.
#[derive(Clone, Default)]
pub struct InMemorySearchService {
    state: Arc<Mutex<State>>,
    master_key: Option<String>,
}

impl InMemorySearchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key used to sign tenant tokens when the options carry none.
    pub fn with_master_key(mut self, key: impl Into<String>) -> Self {
        self.master_key = Some(key.into());
        self
    }

    /// Builder form of `add_key`.
    pub fn with_key(self, key: ApiKey) -> Self {
        self.add_key(key);
        self
    }

    pub fn add_key(&self, key: ApiKey) {
        self.lock().keys.push(key);
    }

    /// Replace the whole key list, as after a key rotation.
    pub fn set_keys(&self, keys: Vec<ApiKey>) {
        self.lock().keys = keys;
    }

    /// Make every call to `op` fail with `err` until cleared.
    pub fn fail_on(&self, op: Operation, err: SearchError) {
        self.lock().failures.insert(op, err);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<SearchCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.lock()
            .indexes
            .get(index)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Documents of an index, ordered by primary key.
    pub fn documents(&self, index: &str) -> Vec<Value> {
        self.lock()
            .indexes
            .get(index)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    // A panic while holding the lock leaves plain data behind, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SearchService for InMemorySearchService {
    fn list_keys(&self) -> Result<KeysResults, SearchError> {
        let mut state = self.lock();
        state.calls.push(SearchCall::ListKeys);
        state.check(Operation::ListKeys)?;

        let total = state.keys.len() as u64;
        Ok(KeysResults {
            results: state.keys.clone(),
            offset: 0,
            limit: total.max(20),
            total,
        })
    }

    fn add_documents(
        &self,
        index: &str,
        documents: &[Value],
        primary_key: Option<&str>,
    ) -> Result<TaskInfo, SearchError> {
        let mut state = self.lock();
        state.calls.push(SearchCall::AddDocuments {
            index: index.to_string(),
            documents: documents.to_vec(),
            primary_key: primary_key.map(str::to_string),
        });
        state.check(Operation::AddDocuments)?;

        let pk = primary_key.unwrap_or("id");
        let mut keyed = Vec::with_capacity(documents.len());
        for doc in documents {
            let id = match doc.get(pk) {
                Some(Value::String(s)) if !s.is_empty() => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    return Err(SearchError::Api {
                        status: 400,
                        code: "missing_document_id".to_string(),
                        message: format!("document doesn't have a `{}` attribute", pk),
                    })
                }
            };
            keyed.push((id, doc.clone()));
        }

        let docs = state.indexes.entry(index.to_string()).or_default();
        for (id, doc) in keyed {
            docs.insert(id, doc);
        }
        Ok(state.enqueue(index, "documentAdditionOrUpdate"))
    }

    fn delete_document(&self, index: &str, id: &str) -> Result<TaskInfo, SearchError> {
        let mut state = self.lock();
        state.calls.push(SearchCall::DeleteDocument {
            index: index.to_string(),
            id: id.to_string(),
        });
        state.check(Operation::DeleteDocument)?;

        if let Some(docs) = state.indexes.get_mut(index) {
            docs.remove(id);
        }
        Ok(state.enqueue(index, "documentDeletion"))
    }

    fn generate_tenant_token(
        &self,
        api_key_uid: &str,
        rules: &SearchRules,
        options: &TenantTokenOptions,
    ) -> Result<String, SearchError> {
        {
            let mut state = self.lock();
            state.calls.push(SearchCall::GenerateTenantToken {
                api_key_uid: api_key_uid.to_string(),
                rules: rules.clone(),
                options: options.clone(),
            });
            state.check(Operation::GenerateTenantToken)?;
        }

        let signing_key = options
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .or(self.master_key.as_deref())
            .unwrap_or_default();
        tenant_token::sign(api_key_uid, rules, signing_key, options.expires_at)
    }
}
