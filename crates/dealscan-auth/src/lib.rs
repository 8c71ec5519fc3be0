//! Dealscan Auth
//!
//! In-memory OAuth token cache with expiry-aware refresh.
//!
//! # Architecture
//!
//! ```text
//! caller → TokenManager::get_access_token → CachedToken (valid?) ─yes→ token
//!                                               │ no
//!                                               ▼
//!                              POST {endpoint}/services/oauth2/token
//! ```
//!
//! The [`TokenManager`] is constructed explicitly and shared by reference.
//! Its [`CachedToken`] sits behind an async mutex that is held across a
//! refresh, so concurrent callers never race a token exchange.
//!
//! # Example
//!
//! ```no_run
//! use dealscan_auth::{AuthConfig, ClientCredentials, TokenManager};
//!
//! # async fn example() -> Result<(), dealscan_auth::AuthError> {
//! let config = AuthConfig::default()
//!     .with_instance_url("https://example.my.salesforce.com")
//!     .with_client_credentials(ClientCredentials::new("id", "secret"));
//! let tokens = TokenManager::new(config)?;
//!
//! if let Some(token) = tokens.get_access_token().await {
//!     println!("token has {} chars", token.len());
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod manager;
mod token;

pub use config::{AuthConfig, ClientCredentials, PasswordCredentials, DEFAULT_LOGIN_DOMAIN};
pub use error::AuthError;
pub use manager::{TokenInfo, TokenManager, DEFAULT_SET_TOKEN_TTL_SECS};
pub use token::{CachedToken, DEFAULT_TOKEN_LIFETIME_SECS, EXPIRY_MARGIN_SECS};
