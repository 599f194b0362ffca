//! Client error types
//!
//! The taxonomy is deliberately flat: either there is no credential to send,
//! or the request failed for any reason at all.

use thiserror::Error;

/// Errors returned by every [`DashboardApi`](super::DashboardApi) call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No bearer token is held; checked before the request is issued
    #[error("Access token not found")]
    MissingCredential,

    /// Non-success status, transport failure or undecodable body
    #[error("{0}")]
    RequestFailed(String),
}

impl ClientError {
    pub fn request_failed(message: impl Into<String>) -> Self {
        ClientError::RequestFailed(message.into())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ClientError::RequestFailed("Request timeout".to_string())
        } else if e.is_connect() {
            ClientError::RequestFailed("Service unavailable".to_string())
        } else {
            ClientError::RequestFailed(e.to_string())
        }
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
