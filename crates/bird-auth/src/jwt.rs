//! HS256 JSON Web Tokens.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{AuthError, Authenticator, Identity};

/// Default lifetime of an issued token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Claims carried by a Bird token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Player name.
    pub sub: String,
    #[serde(default)]
    pub admin: bool,
    /// Issued-at (seconds since epoch).
    pub iat: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

/// Verifies (and can issue) tokens signed with a shared secret.
#[derive(Clone)]
pub struct JwtAuthenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl JwtAuthenticator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl: DEFAULT_TOKEN_TTL,
        }
    }

    /// Overrides how long issued tokens stay valid.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// How long tokens from [`issue`](Self::issue) stay valid.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mints a token for `identity`, valid from `now` for the configured TTL.
    pub fn issue(&self, identity: &Identity, now: SystemTime) -> Result<String, AuthError> {
        let iat = now
            .duration_since(UNIX_EPOCH)
            .map_err(|e| AuthError::Issue(e.to_string()))?
            .as_secs() as i64;
        let claims = Claims {
            sub: identity.name.clone(),
            admin: identity.admin,
            iat,
            exp: iat + self.ttl.as_secs() as i64,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Issue(e.to_string()))
    }

    /// Checks signature and expiry and returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed(e.to_string()),
            })
    }
}

impl std::fmt::Debug for JwtAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuthenticator")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        let claims = self.verify(token).inspect_err(|e| {
            tracing::debug!(error = %e, "token rejected");
        })?;
        if claims.sub.is_empty() {
            return Err(AuthError::Malformed("empty subject".into()));
        }
        Ok(Identity {
            name: claims.sub,
            admin: claims.admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_secret_key_for_testing_purposes_only";

    #[test]
    fn test_issue_and_verify_keeps_claims() {
        let auth = JwtAuthenticator::new(SECRET);
        let now = SystemTime::now();

        let token = auth.issue(&Identity::admin("root"), now).unwrap();
        let claims = auth.verify(&token).unwrap();

        assert_eq!(claims.sub, "root");
        assert!(claims.admin);
        assert_eq!(claims.iat, now.duration_since(UNIX_EPOCH).unwrap().as_secs() as i64);
        assert_eq!(claims.exp, claims.iat + 12 * 60 * 60);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = JwtAuthenticator::new(SECRET);
        let then = SystemTime::now() - Duration::from_secs(13 * 60 * 60);

        let token = auth.issue(&Identity::player("alice"), then).unwrap();

        assert_eq!(auth.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let theirs = JwtAuthenticator::new("secret-A");
        let ours = JwtAuthenticator::new("secret-B");

        let token = theirs.issue(&Identity::player("mallory"), SystemTime::now()).unwrap();

        assert_eq!(ours.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let auth = JwtAuthenticator::new(SECRET);
        assert!(matches!(auth.verify("not.a.jwt"), Err(AuthError::Malformed(_))));
    }

    #[test]
    fn test_custom_ttl_applies_to_issued_tokens() {
        assert_eq!(JwtAuthenticator::new(SECRET).ttl(), DEFAULT_TOKEN_TTL);
        let auth = JwtAuthenticator::new(SECRET).with_ttl(Duration::from_secs(60));
        assert_eq!(auth.ttl(), Duration::from_secs(60));
        let token = auth.issue(&Identity::player("bob"), SystemTime::now()).unwrap();
        let claims = auth.verify(&token).unwrap();
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[tokio::test]
    async fn test_authenticate_returns_identity() {
        let auth = JwtAuthenticator::new(SECRET);
        let token = auth.issue(&Identity::player("carol"), SystemTime::now()).unwrap();

        let identity = auth.authenticate(&token).await.unwrap();

        assert_eq!(identity, Identity::player("carol"));
    }

    #[tokio::test]
    async fn test_authenticate_empty_token_is_missing() {
        let auth = JwtAuthenticator::new(SECRET);
        assert_eq!(auth.authenticate("").await, Err(AuthError::MissingToken));
    }

    #[tokio::test]
    async fn test_authenticate_through_trait_object() {
        let auth: std::sync::Arc<dyn Authenticator> = std::sync::Arc::new(JwtAuthenticator::new(SECRET));
        let token = JwtAuthenticator::new(SECRET)
            .issue(&Identity::player("dave"), SystemTime::now())
            .unwrap();
        assert_eq!(auth.authenticate(&token).await.unwrap().name, "dave");
    }
}
