//! API key resolution by human-readable name.

use tracing::{debug, warn};

use crate::search::{ApiKey, SearchError, SearchService};

/// Name of the search-only key the search engine creates on first start.
pub const DEFAULT_SEARCH_KEY_NAME: &str = "Default Search API Key";

/// The parts of an API key needed to sign tenant tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    pub uid: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("unable to locate search API key named {0:?}")]
    NotFound(String),
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// First key in `keys` named exactly `name` with a non-empty uid and secret.
pub fn find_key<'a>(keys: &'a [ApiKey], name: &str) -> Option<&'a ApiKey> {
    keys.iter().find(|k| {
        k.name.as_deref() == Some(name) && !k.uid.is_empty() && !k.key.is_empty()
    })
}

/// List the service's keys and pick the one named `name`.
///
/// One listing call per invocation; nothing is cached here.
pub fn resolve_key_by_name(
    search: &dyn SearchService,
    name: &str,
) -> Result<ResolvedKey, KeyError> {
    let keys = search.list_keys()?;

    match find_key(&keys.results, name) {
        Some(found) => {
            debug!(name, uid = %found.uid, "resolved search api key");
            Ok(ResolvedKey {
                uid: found.uid.clone(),
                key: found.key.clone(),
            })
        }
        None => {
            warn!(name, listed = keys.results.len(), "search api key not found");
            Err(KeyError::NotFound(name.to_string()))
        }
    }
}
