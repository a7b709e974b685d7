//! Tenant tokens: HS256 JWTs signed with a search API key.
//!
//! The search engine verifies the signature against the key identified by
//! `apiKeyUid` and applies `searchRules` to every query made with the token.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{SearchError, SearchRules};

/// Claims carried by a tenant token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantTokenClaims {
    pub api_key_uid: String,
    pub search_rules: SearchRules,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Sign a tenant token.
///
/// Fails when the signing key or key uid is empty, or when `expires_at` is
/// not in the future.
pub fn sign(
    api_key_uid: &str,
    rules: &SearchRules,
    signing_key: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Result<String, SearchError> {
    if signing_key.is_empty() {
        return Err(SearchError::TenantToken("api key is empty".into()));
    }
    if api_key_uid.is_empty() {
        return Err(SearchError::TenantToken("api key uid is empty".into()));
    }
    if let Some(at) = expires_at {
        if at <= Utc::now() {
            return Err(SearchError::TenantToken(
                "expiry must be in the future".into(),
            ));
        }
    }

    let claims = TenantTokenClaims {
        api_key_uid: api_key_uid.to_string(),
        search_rules: rules.clone(),
        exp: expires_at.map(|at| at.timestamp()),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key.as_bytes()),
    )
    .map_err(|e| SearchError::TenantToken(e.to_string()))
}

/// Verify a token's signature (and expiry, when present) and return its claims.
pub fn verify(token: &str, signing_key: &str) -> Result<TenantTokenClaims, SearchError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();

    decode::<TenantTokenClaims>(
        token,
        &DecodingKey::from_secret(signing_key.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| SearchError::TenantToken(e.to_string()))
}
