//! Token manager: the cached store plus the refresher

use crate::config::{AuthConfig, ClientCredentials, PasswordCredentials};
use crate::error::AuthError;
use crate::token::{CachedToken, DEFAULT_TOKEN_LIFETIME_SECS};
use chrono::{DateTime, Duration, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Token lifetime used by [`TokenManager::set_token`] when none is given
pub const DEFAULT_SET_TOKEN_TTL_SECS: i64 = 7200;

/// Manages an OAuth access token in memory with automatic refresh
///
/// One instance per process or logical session; pass it by reference to
/// whatever needs a bearer token.
pub struct TokenManager {
    config: AuthConfig,
    client: reqwest::Client,
    store: Mutex<CachedToken>,
}

/// Snapshot of the store for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenInfo {
    /// Whether a token is cached
    pub has_token: bool,
    /// Resource endpoint the token authorizes
    pub endpoint_url: Option<String>,
    /// When the token was stored
    pub issued_at: Option<DateTime<Utc>>,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether a cached token is present and still valid
    pub is_valid: bool,
}

/// Success body of the token endpoint
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    instance_url: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// OAuth grant used for an exchange
enum Grant<'a> {
    ClientCredentials(&'a ClientCredentials),
    Password(Option<&'a ClientCredentials>, &'a PasswordCredentials),
}

impl Grant<'_> {
    fn name(&self) -> &'static str {
        match self {
            Grant::ClientCredentials(_) => "client_credentials",
            Grant::Password(_, _) => "password",
        }
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        match self {
            Grant::ClientCredentials(client) => vec![
                ("grant_type", "client_credentials".to_string()),
                ("client_id", client.client_id.clone()),
                ("client_secret", client.client_secret.clone()),
            ],
            Grant::Password(client, user) => {
                let mut form = vec![("grant_type", "password".to_string())];
                if let Some(client) = client {
                    form.push(("client_id", client.client_id.clone()));
                    form.push(("client_secret", client.client_secret.clone()));
                }
                form.push(("username", user.username.clone()));
                form.push(("password", user.password_with_token()));
                form
            }
        }
    }
}

impl TokenManager {
    /// Create a token manager with an empty store
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Client`] if the HTTP client cannot be built.
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| AuthError::Client(e.to_string()))?;

        Ok(Self {
            config,
            client,
            store: Mutex::new(CachedToken::empty()),
        })
    }

    /// The configuration this manager was built with
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Get the current access token, refreshing if needed
    ///
    /// Returns `None` when no valid token is cached and no exchange
    /// succeeded. Exchange failures are logged, never returned.
    pub async fn get_access_token(&self) -> Option<String> {
        let mut store = self.store.lock().await;

        if let Some(token) = store.access_token() {
            if store.is_valid() {
                return Some(token.to_string());
            }
        }

        let client = self.config.client_credentials.as_ref();
        let user = self.config.password_credentials.as_ref();
        if client.is_none() && user.is_none() {
            debug!("No credentials configured; cannot refresh access token");
            return None;
        }

        if let Some(client) = client {
            info!("Access token missing or expired, attempting client credentials flow");
            match self.exchange(&mut store, Grant::ClientCredentials(client)).await {
                Ok(()) => return store.access_token().map(str::to_string),
                Err(e) => warn!("Client credentials flow failed: {}", e),
            }
        }

        if let Some(user) = user {
            info!("Attempting password grant");
            match self.exchange(&mut store, Grant::Password(client, user)).await {
                Ok(()) => return store.access_token().map(str::to_string),
                Err(e) => warn!("Password grant failed: {}", e),
            }
        }

        None
    }

    /// Obtain a new token via the client-credentials grant
    ///
    /// On failure the store is left unchanged. This method never retries.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotConfigured`] without client credentials
    /// - [`AuthError::Rejected`] on any non-200 answer
    /// - [`AuthError::Transport`] / [`AuthError::InvalidResponse`] otherwise
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let client = self
            .config
            .client_credentials
            .as_ref()
            .ok_or(AuthError::NotConfigured)?;

        let mut store = self.store.lock().await;
        self.exchange(&mut store, Grant::ClientCredentials(client)).await
    }

    /// Store an externally obtained token
    ///
    /// `endpoint_url` falls back to the configured instance URL and `ttl`
    /// to two hours.
    pub async fn set_token(
        &self,
        access_token: impl Into<String>,
        endpoint_url: Option<String>,
        ttl: Option<Duration>,
    ) {
        let issued_at = Utc::now();
        let ttl = ttl.unwrap_or_else(|| Duration::seconds(DEFAULT_SET_TOKEN_TTL_SECS));
        let endpoint_url = endpoint_url.or_else(|| self.config.instance_url.clone());

        let token = CachedToken::issue(access_token, issued_at, Some(issued_at + ttl))
            .with_endpoint(endpoint_url)
            .with_token_type("Bearer");

        info!("Token manually set, expires at: {:?}", token.expires_at());
        *self.store.lock().await = token;
    }

    /// Reset the store so the next [`get_access_token`](Self::get_access_token)
    /// performs a fresh exchange
    pub async fn clear(&self) {
        *self.store.lock().await = CachedToken::empty();
        info!("Cleared stored token");
    }

    /// Endpoint the cached token authorizes, else the configured instance URL
    pub async fn endpoint_url(&self) -> Option<String> {
        let store = self.store.lock().await;
        store
            .endpoint_url()
            .map(str::to_string)
            .or_else(|| self.config.instance_url.clone())
    }

    /// Current token information
    pub async fn token_info(&self) -> TokenInfo {
        let store = self.store.lock().await;
        TokenInfo {
            has_token: store.has_token(),
            endpoint_url: store.endpoint_url().map(str::to_string),
            issued_at: store.issued_at(),
            expires_at: store.expires_at(),
            is_valid: store.has_token() && store.is_valid(),
        }
    }

    /// Perform one token exchange and, on success, overwrite the store
    async fn exchange(&self, store: &mut CachedToken, grant: Grant<'_>) -> Result<(), AuthError> {
        let token_url = self.config.token_endpoint();
        info!(grant = grant.name(), "Requesting token from: {}", token_url);

        let response = self
            .client
            .post(&token_url)
            .form(&grant.form())
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let err = AuthError::Rejected {
                status: status.as_u16(),
                body,
            };
            error!("{}", err);
            return Err(err);
        }

        let token_info: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        let issued_at = Utc::now();
        let expires_at = expiry(issued_at, token_info.expires_in);

        let endpoint_url = token_info
            .instance_url
            .or_else(|| store.endpoint_url().map(str::to_string))
            .or_else(|| self.config.instance_url.clone());

        *store = CachedToken::issue(token_info.access_token, issued_at, Some(expires_at))
            .with_endpoint(endpoint_url)
            .with_token_type(token_info.token_type.unwrap_or_else(|| "Bearer".to_string()));

        info!("Successfully obtained new access token via {}", grant.name());
        info!("Token expires at: {:?}", store.expires_at());
        Ok(())
    }
}

/// Expiry for a token issued at `issued_at` with the server's `expires_in`
///
/// A missing or unrepresentable lifetime falls back to the default lifetime.
fn expiry(issued_at: DateTime<Utc>, expires_in: Option<u64>) -> DateTime<Utc> {
    let default = issued_at + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS);
    let Some(secs) = expires_in else {
        return default;
    };
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| issued_at.checked_add_signed(lifetime))
        .unwrap_or_else(|| {
            warn!(expires_in = secs, "Token lifetime out of range, using default");
            default
        })
}
