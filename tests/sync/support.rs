//! Shared fixtures: an app wired to in-memory collaborators.

use std::sync::Arc;

use serde_json::json;
use trail_search::{
    ApiKey, App, Config, InMemoryRecordStore, InMemorySearchService, Record,
    DEFAULT_SEARCH_KEY_NAME,
};

pub struct Harness {
    pub app: App<InMemoryRecordStore>,
    pub search: InMemorySearchService,
    pub store: InMemoryRecordStore,
}

/// Search stub holding the default search key `k1` / `s1`.
pub fn search_with_default_key() -> InMemorySearchService {
    InMemorySearchService::new().with_key(ApiKey::new("k1", "s1", DEFAULT_SEARCH_KEY_NAME))
}

pub fn harness() -> Harness {
    harness_with(search_with_default_key())
}

pub fn harness_with(search: InMemorySearchService) -> Harness {
    let store = InMemoryRecordStore::new();
    let app = App::bootstrap(
        store.clone(),
        Arc::new(search.clone()),
        &Config::new("http://search.test"),
    )
    .expect("bootstrap");
    search.clear_calls();
    Harness { app, search, store }
}

pub fn trail(id: &str) -> Record {
    let mut record = Record::with_id("trails", id);
    record.set("author", "u1");
    record.set("name", "Ridge loop");
    record.set("description", "Steep at the end");
    record.set("location", "Alps");
    record.set("distance", 12500.0);
    record.set("elevation_gain", 830.0);
    record.set("duration", 240.0);
    record.set("category", "c1");
    record.set("public", true);
    record.set("lat", 46.55);
    record.set("lon", 7.98);
    record.set("summit_logs", json!([]));
    record
}
