//! Error types for the chat client.

use courier_identity::IdentityError;
use thiserror::Error;

/// Result type alias for chat operations
pub type ChatResult<T> = Result<T, ChatError>;

/// Main error type for the chat client
#[derive(Debug, Error)]
pub enum ChatError {
    /// The service rejected the bearer token (HTTP 401).
    #[error("unauthorized")]
    Unauthorized,

    /// The held token expired and there is no way to refresh it.
    #[error("token expired")]
    TokenExpired,

    #[error("no token provided")]
    NoTokenProvided,

    #[error("token refresh is not available for this credential")]
    RefreshUnavailable,

    #[error("identity issuance failed: {0}")]
    IssuanceFailed(#[from] IdentityError),

    #[error("identity issuance returned no usable credential")]
    IssuanceReturnedEmpty,

    /// Any other non-success status; `body` is the raw response text.
    #[error("chat service returned {status}: {body}")]
    Remote { status: u16, body: String },

    #[error("invalid chat response: {0}")]
    ResponseDecode(#[source] serde_json::Error),

    #[error("failed to encode chat request: {0}")]
    RequestEncode(#[source] serde_json::Error),

    #[error("invalid chat endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// A continuation link named a host other than the client's endpoint.
    #[error("refusing to follow link outside the chat endpoint: {0}")]
    ForeignLink(String),

    #[error("chat http request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ChatError {
    /// Create a remote error from a status code and raw body
    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        Self::Remote {
            status,
            body: body.into(),
        }
    }

    /// Whether the caller needs a fresh credential before trying again.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized
                | Self::TokenExpired
                | Self::NoTokenProvided
                | Self::IssuanceFailed(_)
                | Self::IssuanceReturnedEmpty
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_mentions_status_and_body() {
        let err = ChatError::remote(500, "boom");
        assert_eq!(err.to_string(), "chat service returned 500: boom");
        assert!(!err.requires_reauthentication());
    }

    #[test]
    fn token_errors_require_reauthentication() {
        assert!(ChatError::Unauthorized.requires_reauthentication());
        assert!(ChatError::TokenExpired.requires_reauthentication());
        assert!(ChatError::NoTokenProvided.requires_reauthentication());
        assert!(!ChatError::RefreshUnavailable.requires_reauthentication());
    }
}
