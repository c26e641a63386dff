use thiserror::Error;

/// Session authentication failure. Terminal for the whole session group:
/// every marker sharing the failed credentials is flagged without any
/// attachment lookups being issued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The api-token request never reached the service.
    #[error("api token request failed: {0}")]
    TokenRequest(String),

    /// The api-token endpoint answered with a non-success status.
    #[error("api token endpoint returned HTTP {0}")]
    TokenStatus(u16),

    /// The api-token body was unreadable or carried no token.
    #[error("api token response malformed: {0}")]
    TokenBody(String),

    /// The validation request never reached the service.
    #[error("token validation request failed: {0}")]
    ValidationRequest(String),

    /// The service rejected the token during claim validation.
    #[error("token validation rejected with HTTP {0}")]
    ValidationStatus(u16),
}

/// Attachment lookup failure. Terminal for one marker only; the rest of the
/// session group keeps resolving.
///
/// Variants are `Clone` so a failed lookup can live in the request cache and
/// be handed to every marker that shares the key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Network-level failure on both the primary and (when configured) the
    /// fallback transport.
    #[error("attachment transport failed: {0}")]
    Transport(String),

    /// The attachment endpoint answered with a non-success status.
    #[error("attachment endpoint returned HTTP {0}")]
    Status(u16),

    /// The body arrived but did not match the deployment's response shape.
    #[error("attachment response malformed: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Projects a transport error into its cacheable form. `reqwest` errors
    /// hold connection state and are not `Clone`, so only the classified
    /// message is kept.
    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}
