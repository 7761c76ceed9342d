//! Error types for the authentication layer.

use thiserror::Error;

/// Authentication error type.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Claims endpoint returned an error response.
    #[error("claims endpoint error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the endpoint.
        message: String,
    },

    /// Interactive sign-in was dismissed or failed.
    #[error("sign-in failed: {0}")]
    SignIn(String),

    /// The identity provider could not produce a fresh token.
    #[error("token refresh failed: {0}")]
    TokenRefresh(String),
}

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, Error>;
