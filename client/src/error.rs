//! Client error types

use thiserror::Error;

/// Errors returned by the API client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport-level failure (connect, TLS, timeout)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the request and a refresh was not possible
    /// or did not help
    #[error("Unauthorized")]
    Unauthorized,

    /// No refresh token is stored, so a 401 cannot be recovered from
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// Non-401 error response from the API
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;
