//! Bearer token acquisition and renewal
//!
//! A [`TokenManager`] owns the single bearer credential for a process run.
//! The first use performs a password grant; once the token ages past its
//! lifetime minus the safety margin, the next use performs a refresh grant.
//! Exactly one exchange happens per invalidation, and a valid token is
//! returned without any network traffic.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::config::{TOKEN_EXPIRY_MARGIN, TOKEN_PATH};
use crate::transport::ThrottledClient;

use super::{AuthError, AuthResult, Credentials};

/// Token endpoint response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: u64,
}

/// A bearer credential with its issue time and lifetime.
///
/// Replaced wholesale on refresh, never partially mutated.
#[derive(Debug, Clone)]
pub struct BearerToken {
    access_token: String,
    refresh_token: String,
    issued_at: DateTime<Utc>,
    ttl: Duration,
}

impl BearerToken {
    fn issued_now(grant: TokenResponse) -> Self {
        Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            issued_at: Utc::now(),
            ttl: Duration::from_secs(grant.expires_in),
        }
    }

    /// The access token value, as placed in the `Authorization` header.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// The refresh token paired with this access token.
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Whether the token is still usable, leaving `margin` of its lifetime
    /// unspent.
    pub fn is_valid(&self, margin: Duration) -> bool {
        self.is_valid_at(Utc::now(), margin)
    }

    fn is_valid_at(&self, now: DateTime<Utc>, margin: Duration) -> bool {
        let usable = self.ttl.saturating_sub(margin);
        match now.signed_duration_since(self.issued_at).to_std() {
            Ok(elapsed) => elapsed < usable,
            // issued_at in the future means clock skew; treat as fresh
            Err(_) => true,
        }
    }
}

/// Owns the process's bearer credential and its renewal.
pub struct TokenManager {
    transport: Arc<ThrottledClient>,
    credentials: Credentials,
    token_url: String,
    margin: Duration,
    current: Option<BearerToken>,
}

impl TokenManager {
    /// Create a manager against the given API base URL.
    pub fn new(
        transport: Arc<ThrottledClient>,
        credentials: Credentials,
        api_base: impl AsRef<str>,
    ) -> Self {
        Self {
            transport,
            credentials,
            token_url: format!("{}{}", api_base.as_ref(), TOKEN_PATH),
            margin: TOKEN_EXPIRY_MARGIN,
            current: None,
        }
    }

    /// Return a currently valid access token, exchanging or refreshing as
    /// needed.
    ///
    /// # Errors
    /// Returns [`AuthError`] when the grant exchange fails or answers with an
    /// unusable body.
    pub async fn bearer(&mut self) -> AuthResult<String> {
        let refresh_with = match &self.current {
            None => None,
            Some(token) if token.is_valid(self.margin) => {
                debug!("reusing cached access token");
                return Ok(token.access_token().to_string());
            }
            Some(token) => Some(token.refresh_token().to_string()),
        };

        let token = match refresh_with {
            None => {
                info!("acquiring access token via password grant");
                self.exchange(&[
                    ("client_id", self.credentials.client_id.as_str()),
                    ("client_secret", self.credentials.client_secret.as_str()),
                    ("username", self.credentials.username.as_str()),
                    ("password", self.credentials.password.as_str()),
                    ("grant_type", "password"),
                ])
                .await?
            }
            Some(refresh_token) => {
                info!("refreshing expired access token");
                self.exchange(&[
                    ("client_id", self.credentials.client_id.as_str()),
                    ("client_secret", self.credentials.client_secret.as_str()),
                    ("refresh_token", refresh_token.as_str()),
                    ("grant_type", "refresh_token"),
                ])
                .await?
            }
        };

        let access = token.access_token().to_string();
        self.current = Some(token);
        Ok(access)
    }

    async fn exchange(&self, params: &[(&str, &str)]) -> AuthResult<BearerToken> {
        let request = self.transport.post(&self.token_url).form(params);
        let response = self.transport.send(request).await?;
        let grant: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;
        Ok(BearerToken::issued_now(grant))
    }
}
