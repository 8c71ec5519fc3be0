//! Cached token state and its validity policy

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Safety margin before `expires_at` after which a token counts as expired
pub const EXPIRY_MARGIN_SECS: i64 = 5 * 60;

/// Assumed token lifetime when the server gives no expiry hint (2 hours)
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 2 * 60 * 60;

/// Cached credential state
///
/// Invariant: if `access_token` is present, `issued_at` is present. The only
/// ways to populate a token go through [`CachedToken::issue`], which takes
/// both.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct CachedToken {
    access_token: Option<String>,
    endpoint_url: Option<String>,
    token_type: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// An empty store
    pub fn empty() -> Self {
        Self::default()
    }

    /// A freshly issued token
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{Duration, Utc};
    /// use dealscan_auth::CachedToken;
    ///
    /// let now = Utc::now();
    /// let token = CachedToken::issue("abc", now, Some(now + Duration::hours(1)));
    /// assert!(token.is_valid_at(now));
    /// assert!(!token.is_valid_at(now + Duration::minutes(56)));
    /// ```
    pub fn issue(
        access_token: impl Into<String>,
        issued_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            access_token: Some(access_token.into()),
            endpoint_url: None,
            token_type: None,
            issued_at: Some(issued_at),
            expires_at,
        }
    }

    /// Attach the resource endpoint the token authorizes
    pub fn with_endpoint(mut self, endpoint_url: Option<String>) -> Self {
        self.endpoint_url = endpoint_url;
        self
    }

    /// Attach the token type reported by the server
    pub fn with_token_type(mut self, token_type: impl Into<String>) -> Self {
        self.token_type = Some(token_type.into());
        self
    }

    /// The cached access token, if any
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Resource endpoint the token authorizes
    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    /// Token type, `Bearer` unless the server said otherwise
    pub fn token_type(&self) -> &str {
        self.token_type.as_deref().unwrap_or("Bearer")
    }

    /// When the token was stored
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    /// When the token expires
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Whether a token is present at all
    pub fn has_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Validity at `now`
    ///
    /// - expiry known: valid while `now` is more than the safety margin
    ///   before `expires_at`
    /// - only issue time known: valid for the default lifetime after issue
    /// - neither known: valid
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        match (self.expires_at, self.issued_at) {
            (Some(expires_at), _) => now < expires_at - Duration::seconds(EXPIRY_MARGIN_SECS),
            (None, Some(issued_at)) => now < issued_at + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS),
            (None, None) => true,
        }
    }

    /// Validity against the wall clock
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

impl fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedToken")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("endpoint_url", &self.endpoint_url)
            .field("token_type", &self.token_type())
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
