//! Player identity for Bird.
//!
//! - [`Authenticator`]: the hook the server calls to turn a request token
//!   into an [`Identity`]
//! - [`JwtAuthenticator`]: HS256 tokens with `sub`, `admin`, `iat`, `exp`
//! - [`AuthError`]: why a token was refused
//!
//! # How it fits in the stack
//!
//! ```text
//! HTTP layer (above)  ← extracts a token from the cookie or header
//!     ↕
//! Auth layer (this crate)  ← token → Identity { name, admin }
//! ```

mod auth;
mod error;
mod jwt;

pub use auth::{Authenticator, Identity};
pub use error::AuthError;
pub use jwt::{Claims, DEFAULT_TOKEN_TTL, JwtAuthenticator};
