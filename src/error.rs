// Error kinds returned by the library. Each workflow stage returns one of
// these explicitly; the UI decides whether a failure is fatal for the run.

use thiserror::Error;

/// Problems with the local setup that prevent the workflow from starting.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("API key is required")]
    MissingApiKey,

    #[error("API key contains characters that are not allowed in an HTTP header")]
    InvalidApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Failure of a single call against the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure before a response was read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-success status. `body` is the
    /// response text, kept verbatim for diagnostics.
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The body arrived but was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return ApiError::Decode(err.to_string());
        }
        if let Some(status) = err.status() {
            return ApiError::Status {
                status: status.as_u16(),
                body: String::new(),
            };
        }
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}
