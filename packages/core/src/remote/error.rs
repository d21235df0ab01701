//! Remote API Error Types
//!
//! Errors raised by the collaborators that talk to the remote hierarchy:
//! authentication, listing and creation calls.

use thiserror::Error;

/// Remote call errors
#[derive(Error, Debug)]
pub enum RemoteError {
    /// A session-scoped call was made before `authenticate()` succeeded
    #[error("Not authenticated - call authenticate() first")]
    NotAuthenticated,

    /// Credentials were refused
    #[error("Authentication rejected: {0}")]
    AuthenticationRejected(String),

    /// Transport-level failure (connect, timeout, body decoding)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The response was well-formed HTTP but not what the API promises
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// Create an API status error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an authentication rejected error
    pub fn authentication_rejected(reason: impl Into<String>) -> Self {
        Self::AuthenticationRejected(reason.into())
    }

    /// Create an invalid response error
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}
