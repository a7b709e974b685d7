//! Configuration for the search service connection.
//!
//! Read once at process start. `from_env` fails when the service URL is
//! missing so a misconfigured process stops before serving requests.

use chrono::{Duration, Utc};

use crate::keys::DEFAULT_SEARCH_KEY_NAME;

pub const ENV_SEARCH_URL: &str = "MEILI_URL";
pub const ENV_MASTER_KEY: &str = "MEILI_MASTER_KEY";
pub const ENV_SEARCH_KEY_NAME: &str = "MEILI_SEARCH_KEY_NAME";
pub const ENV_TOKEN_TTL_SECS: &str = "MEILI_TOKEN_TTL_SECS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the search service, e.g. `http://localhost:7700`.
    pub search_url: String,
    pub master_key: Option<String>,
    /// Name of the API key whose secret signs tenant tokens.
    pub search_key_name: String,
    /// Lifetime of issued tenant tokens; `None` issues non-expiring tokens.
    pub token_ttl: Option<Duration>,
}

impl Config {
    pub fn new(search_url: impl Into<String>) -> Self {
        Self {
            search_url: search_url.into(),
            master_key: None,
            search_key_name: DEFAULT_SEARCH_KEY_NAME.to_string(),
            token_ttl: None,
        }
    }

    pub fn with_master_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.master_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    pub fn with_search_key_name(mut self, name: impl Into<String>) -> Self {
        self.search_key_name = name.into();
        self
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = Some(ttl);
        self
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let search_url = non_empty(ENV_SEARCH_URL).ok_or(ConfigError::Missing(ENV_SEARCH_URL))?;
        let mut config = Config::new(search_url);

        if let Some(key) = non_empty(ENV_MASTER_KEY) {
            config = config.with_master_key(key);
        }
        if let Some(name) = non_empty(ENV_SEARCH_KEY_NAME) {
            config = config.with_search_key_name(name);
        }
        if let Some(raw) = non_empty(ENV_TOKEN_TTL_SECS) {
            config = config.with_token_ttl(parse_ttl(ENV_TOKEN_TTL_SECS, &raw)?);
        }

        Ok(config)
    }
}

/// Parse a token lifetime in whole seconds.
///
/// The lifetime must be positive and an expiry computed from it must stay
/// within the representable calendar range.
fn parse_ttl(var: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let secs: i64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("expected a whole number of seconds"))?;
    if secs <= 0 {
        return Err(invalid("must be positive"));
    }
    let ttl = Duration::try_seconds(secs).ok_or_else(|| invalid("too large"))?;
    if Utc::now().checked_add_signed(ttl).is_none() {
        return Err(invalid("expiry would be out of range"));
    }
    Ok(ttl)
}
