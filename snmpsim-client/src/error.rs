//! Error types returned by every client operation.

use thiserror::Error;

/// Client result type alias
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors surfaced by the management and metrics clients.
///
/// Nothing is retried or swallowed internally: the caller decides how to react,
/// typically by branching on [`ClientError::status_code`].
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced an HTTP response (connection refused, timeout).
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx body could not be decoded into the expected type.
    #[error("Failed to decode response body: {source}")]
    Decode {
        #[from]
        source: serde_json::Error,
    },

    /// The configured base URL, or a URL derived from it, is not valid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An argument was rejected before any request was sent.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Reading a local file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status carried by an [`ClientError::Http`] error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for a 404 response. Cleanup code treats this as "already absent".
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }

    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        ClientError::InvalidArgument(message.into())
    }
}
