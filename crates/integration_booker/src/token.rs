//! Bearer-token acquisition and caching
//!
//! The Booker API issues short-lived bearer tokens in exchange for the
//! long-lived API key. [`TokenManager`] caches one credential and refreshes
//! it when it comes within [`STALENESS_MARGIN_SECS`] of expiry. The
//! check-then-refresh sequence runs under a single async mutex, so
//! concurrent callers seeing a stale credential trigger exactly one
//! upstream issuance between them.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::classify::snippet;
use crate::config::BookerConfig;
use crate::error::BookerError;

/// A credential this close to expiry is treated as already stale
pub const STALENESS_MARGIN_SECS: i64 = 60;

/// Assumed lifetime for tokens whose payload cannot be decoded
pub const FALLBACK_LIFETIME_MINS: i64 = 14;

/// A cached bearer token and its expiry instant
#[derive(Clone)]
struct Credential {
    token: String,
    expires_at: DateTime<Utc>,
}

impl Credential {
    /// Whether the credential can still be used at `now`
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(STALENESS_MARGIN_SECS)
    }
}

/// Issues and caches bearer tokens for the Booker API
pub struct TokenManager {
    http: Client,
    config: BookerConfig,
    cached: Mutex<Option<Credential>>,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("base_url", &self.config.base_url)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    /// Create a manager that issues tokens over the given HTTP client
    #[must_use]
    pub fn new(config: BookerConfig, http: Client) -> Self {
        Self {
            http,
            config,
            cached: Mutex::new(None),
        }
    }

    /// Get a usable bearer token, refreshing the cache if necessary
    ///
    /// The cache lock is held across the refresh so concurrent stale
    /// callers queue here and reuse the one new credential.
    ///
    /// # Errors
    ///
    /// Returns [`BookerError::CredentialUnavailable`] when no API key is
    /// configured or the token endpoint does not produce a usable token;
    /// nothing is cached in that case.
    pub async fn bearer_token(&self) -> Result<String, BookerError> {
        let mut slot = self.cached.lock().await;

        if let Some(credential) = slot.as_ref() {
            if credential.is_fresh(Utc::now()) {
                return Ok(credential.token.clone());
            }
        }

        let credential = self.issue().await?;
        let token = credential.token.clone();
        *slot = Some(credential);
        Ok(token)
    }

    /// Drop the cached credential so the next call issues a new one
    ///
    /// Call sites do this after a 401, which means the provider stopped
    /// honouring the token before its decoded expiry.
    pub async fn invalidate(&self) {
        let mut slot = self.cached.lock().await;
        *slot = None;
    }

    /// Exchange the configured API key for a fresh bearer token
    async fn issue(&self) -> Result<Credential, BookerError> {
        let api_key = self.config.api_key_str().ok_or_else(|| {
            BookerError::CredentialUnavailable("no API key configured".to_string())
        })?;

        let url = self.config.endpoint("token");
        let request = TokenRequest {
            company_id: &self.config.company_id,
            api_key,
            subject: "*",
        };

        debug!(%url, "Requesting dispatch bearer token");

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| BookerError::CredentialUnavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BookerError::CredentialUnavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(BookerError::CredentialUnavailable(format!(
                "token endpoint returned HTTP {status}: {}",
                snippet(&body)
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|_| {
            BookerError::CredentialUnavailable(format!(
                "token response was not JSON: {}",
                snippet(&body)
            ))
        })?;

        if parsed.token.is_empty() {
            return Err(BookerError::CredentialUnavailable(
                "token response carried an empty token".to_string(),
            ));
        }

        let expires_at = token_expiry(&parsed.token).unwrap_or_else(|| {
            debug!("Token payload undecodable, assuming {FALLBACK_LIFETIME_MINS} minute lifetime");
            Utc::now() + Duration::minutes(FALLBACK_LIFETIME_MINS)
        });

        debug!(%expires_at, "Issued dispatch bearer token");
        Ok(Credential {
            token: parsed.token,
            expires_at,
        })
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    company_id: &'a str,
    api_key: &'a str,
    subject: &'a str,
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: String,
}

/// Decode the middle segment of a three-segment token as URL-safe
/// base64 JSON
///
/// Returns `None` for anything that is not shaped like a signed token;
/// callers fall back to other sources of the same information.
pub(crate) fn decode_claims(token: &str) -> Option<Value> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return None;
    }
    let payload = URL_SAFE_NO_PAD.decode(segments[1]).ok()?;
    serde_json::from_slice(&payload).ok()
}

/// Read the expiry instant from a token's `exp` claim
fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let claims = decode_claims(token)?;
    let exp = claims.get("exp")?.as_i64()?;
    DateTime::from_timestamp(exp, 0)
}
