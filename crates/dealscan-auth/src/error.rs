//! Error types for token acquisition

use thiserror::Error;

/// Errors that can occur while obtaining an access token
#[derive(Error, Debug)]
pub enum AuthError {
    /// No client credentials are configured for the requested grant
    #[error("OAuth client credentials are not configured")]
    NotConfigured,

    /// The authorization server answered with a non-200 status
    #[error("Failed to get token: {status} - {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body as returned by the server
        body: String,
    },

    /// Network failure talking to the authorization server
    #[error("Token request failed: {0}")]
    Transport(String),

    /// The server returned 200 but the body is not a token response
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}
