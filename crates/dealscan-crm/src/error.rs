//! Error types for CRM access

use thiserror::Error;

/// Errors that can occur talking to the CRM
#[derive(Debug, Error)]
pub enum CrmError {
    /// No usable access token could be obtained
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The token was rejected (HTTP 401/403)
    #[error("Unauthorized: HTTP {status}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
    },

    /// Record, document or version does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other HTTP or network failure
    #[error("Transfer error: {0}")]
    Transfer(String),

    /// The CRM answered with a body we could not decode
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A record id failed validation before being placed in a query
    #[error("Invalid record id '{0}'")]
    InvalidId(String),
}

impl CrmError {
    /// Whether this error means the bearer token was rejected
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CrmError::Unauthorized { .. })
    }
}

impl From<reqwest::Error> for CrmError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            CrmError::InvalidResponse(e.to_string())
        } else {
            CrmError::Transfer(e.to_string())
        }
    }
}

impl From<dealscan_auth::AuthError> for CrmError {
    fn from(e: dealscan_auth::AuthError) -> Self {
        CrmError::Auth(e.to_string())
    }
}
