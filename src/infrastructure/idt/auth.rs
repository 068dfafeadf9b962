//! IDT OAuth token provider
//!
//! Holds the single cached access token behind an async mutex. The lock is
//! held across the whole check-and-refresh, so concurrent callers that find
//! the token expired wait for one exchange and then share its result.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Duration;
use reqwest::Client;
use tokio::sync::Mutex;

use super::models::{TokenResponse, DEFAULT_EXPIRES_IN};
use crate::application::errors::AuthError;
use crate::domain::entities::AccessToken;
use crate::domain::traits::TokenSource;
use crate::infrastructure::config::{Credentials, GrantType, IdtConfig};

/// Exchanges client credentials for bearer tokens and caches them
pub struct TokenProvider {
    http: Client,
    token_url: String,
    scope: String,
    grant: GrantType,
    client_id: String,
    client_secret: String,
    username: String,
    password: String,
    margin: Duration,
    cache: Mutex<Option<AccessToken>>,
    exchanges: AtomicU64,
}

impl TokenProvider {
    pub fn new(http: Client, config: &IdtConfig, credentials: &Credentials) -> Self {
        Self {
            http,
            token_url: config.token_url(),
            scope: config.scope.clone(),
            grant: config.grant,
            client_id: credentials.idt_client_id.clone(),
            client_secret: credentials.idt_client_secret.clone(),
            username: credentials.idt_username.clone(),
            password: credentials.idt_password.clone(),
            margin: Duration::seconds(config.refresh_margin_seconds),
            cache: Mutex::new(None),
            exchanges: AtomicU64::new(0),
        }
    }

    /// Replace the cached token without performing an exchange
    pub async fn seed(&self, token: AccessToken) {
        *self.cache.lock().await = Some(token);
    }

    /// Number of token exchanges performed so far
    pub fn exchange_count(&self) -> u64 {
        self.exchanges.load(Ordering::Relaxed)
    }

    /// Return a token with more than the safety margin of lifetime left,
    /// exchanging credentials only when the cache is empty or stale.
    pub async fn get_valid_token(&self) -> Result<AccessToken, AuthError> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref() {
            if token.is_usable(self.margin) {
                return Ok(token.clone());
            }
            tracing::debug!("Cached IDT token expires at {}, refreshing", token.expires_at);
        }

        let fresh = self.exchange().await?;
        *cache = Some(fresh.clone());
        Ok(fresh)
    }

    /// Replace a token the vendor refused. If another caller already replaced
    /// it, that newer token is returned without a second exchange.
    pub async fn force_refresh(&self, rejected: &AccessToken) -> Result<AccessToken, AuthError> {
        let mut cache = self.cache.lock().await;
        if let Some(current) = cache.as_ref() {
            if current.token != rejected.token && current.is_usable(self.margin) {
                return Ok(current.clone());
            }
        }
        *cache = None;

        let fresh = self.exchange().await?;
        *cache = Some(fresh.clone());
        Ok(fresh)
    }

    async fn exchange(&self) -> Result<AccessToken, AuthError> {
        tracing::info!("Requesting new IDT access token...");
        self.exchanges.fetch_add(1, Ordering::Relaxed);

        let request = match self.grant {
            GrantType::ClientCredentials => self.http.post(&self.token_url).form(&[
                ("grant_type", "client_credentials"),
                ("scope", self.scope.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ]),
            GrantType::Password => self
                .http
                .post(&self.token_url)
                .basic_auth(&self.client_id, Some(&self.client_secret))
                .form(&[
                    ("grant_type", "password"),
                    ("scope", self.scope.as_str()),
                    ("username", self.username.as_str()),
                    ("password", self.password.as_str()),
                ]),
        };

        let response = request
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                "IDT token request rejected: HTTP {} {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            );
            return Err(AuthError::Rejected { status: status.as_u16() });
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        if body.access_token.trim().is_empty() {
            return Err(AuthError::InvalidResponse("empty access_token".to_string()));
        }

        let expires_in = body.expires_in.unwrap_or(DEFAULT_EXPIRES_IN);
        if expires_in <= 0 {
            return Err(AuthError::InvalidResponse(format!("non-positive expires_in {}", expires_in)));
        }
        tracing::info!("IDT token acquired (expires in {}s)", expires_in);
        Ok(AccessToken::issued_now(body.access_token, expires_in))
    }
}

#[async_trait]
impl TokenSource for TokenProvider {
    async fn get_valid_token(&self) -> Result<AccessToken, AuthError> {
        TokenProvider::get_valid_token(self).await
    }

    async fn force_refresh(&self, rejected: &AccessToken) -> Result<AccessToken, AuthError> {
        TokenProvider::force_refresh(self, rejected).await
    }
}
