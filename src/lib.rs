pub mod app;
pub mod config;
pub mod hooks;
pub mod index;
pub mod keys;
pub mod record;
pub mod search;
pub mod seed;
pub mod token;
pub mod wiring;

pub use app::{App, BootstrapError};
pub use config::{Config, ConfigError};
pub use hooks::{HookContext, HookError, Hooks, Phase};
pub use index::{delete_trail, index_trail, GeoPoint, TrailDocument, TRAILS_INDEX};
pub use keys::{resolve_key_by_name, KeyError, ResolvedKey, DEFAULT_SEARCH_KEY_NAME};
pub use record::{
    FsRecordStore, InMemoryRecordStore, Record, RecordError, RecordFile, RecordStore,
};
#[cfg(feature = "http")]
pub use search::HttpSearchClient;
pub use search::{
    ApiKey, InMemorySearchService, KeysResults, SearchError, SearchRules, SearchService,
    TaskInfo, TenantTokenOptions,
};
pub use seed::{seed_categories, SeedError};
pub use token::{issue_token, search_rules, TokenError, TokenIssuer};
pub use wiring::{register_sync_hooks, SyncState};
