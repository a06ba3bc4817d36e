//! Request authentication.
//!
//! The token comes from the `jwt_token` cookie, falling back to an
//! `Authorization: Bearer` header.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use bird_auth::{AuthError, Identity};

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the cookie that carries the player's token.
pub const TOKEN_COOKIE: &str = "jwt_token";

/// The authenticated caller. Extracting it rejects the request with 401
/// when the token is missing or invalid.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(AuthError::MissingToken)?;
        let identity = state.auth.authenticate(&token).await?;
        tracing::debug!(player = %identity.name, admin = identity.admin, "authenticated");
        Ok(Self(identity))
    }
}

/// Finds the caller's token, preferring the cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    cookie_token(headers).or_else(|| bearer_token(headers))
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_token_from_cookie() {
        let h = headers(&[(COOKIE, "theme=dark; jwt_token=abc.def.ghi")]);
        assert_eq!(token_from_headers(&h).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_token_from_bearer_header() {
        let h = headers(&[(AUTHORIZATION, "Bearer xyz")]);
        assert_eq!(token_from_headers(&h).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let h = headers(&[(AUTHORIZATION, "Bearer from-header"), (COOKIE, "jwt_token=from-cookie")]);
        assert_eq!(token_from_headers(&h).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_no_token_is_none() {
        assert_eq!(token_from_headers(&HeaderMap::new()), None);
        let h = headers(&[(AUTHORIZATION, "Basic dXNlcg=="), (COOKIE, "jwt_token=")]);
        assert_eq!(token_from_headers(&h), None);
    }
}
