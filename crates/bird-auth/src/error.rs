//! Error types for the auth layer.

/// Why a request could not be tied to an identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The request carried no token at all.
    #[error("missing auth token")]
    MissingToken,

    /// The token could not be parsed or failed validation for a reason
    /// other than expiry or signature.
    #[error("malformed auth token: {0}")]
    Malformed(String),

    /// The token's `exp` is in the past.
    #[error("auth token expired")]
    Expired,

    /// The token was not signed with our secret.
    #[error("invalid token signature")]
    InvalidSignature,

    /// A token could not be issued.
    #[error("failed to issue token: {0}")]
    Issue(String),
}
