use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::store::{StoreError, StoreResult};

const API_KEY_GRANT: &str = "urn:ibm:params:oauth:grant-type:apikey";

#[derive(Debug, Deserialize)]
struct IamTokenResponse {
    access_token: String,
    /// Lifetime in seconds
    expires_in: i64,
    /// Absolute expiry, unix seconds
    expiration: Option<i64>,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: i64,
    refresh_at: i64,
}

impl CachedToken {
    fn from_response(response: IamTokenResponse, now: i64) -> Self {
        let lifetime = response.expires_in.max(0);
        let expires_at = response.expiration.unwrap_or(now.saturating_add(lifetime));
        Self {
            access_token: response.access_token,
            expires_at,
            // Renew once 80% of the lifetime has gone
            refresh_at: expires_at - lifetime / 5,
        }
    }

    fn is_fresh(&self, now: i64) -> bool {
        now < self.refresh_at && now < self.expires_at
    }
}

/// Exchanges an API key for IAM bearer tokens and caches the result.
///
/// Only one exchange runs at a time; concurrent callers wait on the lock
/// and then reuse the token it produced.
pub struct IamAuthenticator {
    client: Client,
    token_url: String,
    api_key: Secret<String>,
    cached: Mutex<Option<CachedToken>>,
}

impl IamAuthenticator {
    pub fn new(client: Client, token_url: &str, api_key: Secret<String>) -> Self {
        Self {
            client,
            token_url: token_url.to_string(),
            api_key,
            cached: Mutex::new(None),
        }
    }

    /// A valid bearer token, exchanging the API key if the cached one is stale
    pub async fn access_token(&self) -> StoreResult<String> {
        let mut cached = self.cached.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = cached.as_ref().filter(|token| token.is_fresh(now)) {
            return Ok(token.access_token.clone());
        }

        let token = self.request_token(now).await?;
        let access_token = token.access_token.clone();
        *cached = Some(token);
        Ok(access_token)
    }

    /// Forget the cached token so the next request performs a fresh exchange
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    async fn request_token(&self, now: i64) -> StoreResult<CachedToken> {
        log::debug!("Requesting IAM access token from {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[
                ("grant_type", API_KEY_GRANT),
                ("apikey", self.api_key.expose_secret().as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::TokenExchange(format!(
                "IAM returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: IamTokenResponse = response
            .json()
            .await
            .map_err(|e| StoreError::TokenExchange(e.to_string()))?;

        let token = CachedToken::from_response(token, now);
        log::debug!("IAM access token valid until {}", token.expires_at);
        Ok(token)
    }
}
