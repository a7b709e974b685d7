//! Error type for hook handlers.

use crate::keys::KeyError;
use crate::record::RecordError;
use crate::search::SearchError;
use crate::token::TokenError;

/// Error returned by a hook handler; aborts the originating request.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    /// The search service call failed.
    #[error("search service error: {0}")]
    Search(#[from] SearchError),
    /// The configured search key could not be resolved.
    #[error("search key error: {0}")]
    Key(#[from] KeyError),
    /// Reading or writing a record failed.
    #[error("record error: {0}")]
    Record(#[from] RecordError),
}

impl From<TokenError> for HookError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Search(e) => HookError::Search(e),
            TokenError::Record(e) => HookError::Record(e),
        }
    }
}

impl HookError {
    /// Map this error to the HTTP status the request fails with.
    pub fn status_code(&self) -> u16 {
        match self {
            HookError::Search(_) => 502,
            HookError::Key(KeyError::Search(_)) => 502,
            HookError::Key(KeyError::NotFound(_)) => 500,
            HookError::Record(RecordError::NotFound { .. }) => 404,
            HookError::Record(RecordError::InvalidId(_)) => 400,
            HookError::Record(RecordError::AlreadyExists { .. }) => 400,
            HookError::Record(_) => 500,
        }
    }
}
