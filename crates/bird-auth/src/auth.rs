//! Authentication hook for validating player identity.
//!
//! Bird doesn't run a login flow itself. It defines the [`Authenticator`]
//! trait: one async method that takes a token string and returns an
//! [`Identity`] or an error. The server holds one behind an `Arc<dyn _>`
//! and calls it for every request.
//!
//! [`JwtAuthenticator`](crate::JwtAuthenticator) is the implementation the
//! binary uses; tests and embedders can plug in their own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::AuthError;

/// Who is making a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// The player's name. This is what appears in a room's seats.
    pub name: String,
    /// Admins may watch any room and manage any lobby.
    pub admin: bool,
}

impl Identity {
    pub fn player(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: false,
        }
    }

    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            admin: true,
        }
    }
}

/// Validates a client's auth token and returns their identity.
///
/// `#[async_trait]` boxes the returned future, which keeps the trait
/// object-safe so the server can store an `Arc<dyn Authenticator>`.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use bird_auth::{AuthError, Authenticator, Identity};
///
/// /// Treats the token as the player name. Development only.
/// struct DevAuthenticator;
///
/// #[async_trait]
/// impl Authenticator for DevAuthenticator {
///     async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
///         if token.is_empty() {
///             return Err(AuthError::MissingToken);
///         }
///         Ok(Identity::player(token))
///     }
/// }
/// ```
#[async_trait]
pub trait Authenticator: Send + Sync + 'static {
    /// Validates the given token and returns the caller's identity.
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError>;
}
