//! Error types for the search service client.

use thiserror::Error;

/// Transport failures of the search service.
///
/// Every variant means the call produced no usable answer; callers decide
/// whether to keep their previous state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request could not be sent or the connection failed
    #[error("Request failed: {0}")]
    Request(String),

    /// The request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The service answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A nearest-neighbour response carried an empty result list
    #[error("Service returned no results")]
    NoResults,

    /// The client could not be configured
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Request(err.to_string())
        }
    }
}
