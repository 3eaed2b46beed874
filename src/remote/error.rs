//! Error types for remote service clients.

/// Result type for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Error type for token acquisition and imagery requests.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// Required configuration is missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Every token endpoint was tried and none produced a token.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The remote service answered with a non-success status.
    /// The raw response body is carried for diagnostics.
    #[error("Remote service error ({status}): {body}")]
    Service { status: u16, body: String },

    /// The response body did not match the expected schema.
    #[error("Unexpected response shape at {path}: {message}")]
    Schema { path: String, message: String },

    /// Transport-level failure (connection, TLS, request build).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RemoteError {
    pub(crate) fn schema(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        Self::Schema {
            path: err.path().to_string(),
            message: err.inner().to_string(),
        }
    }
}
