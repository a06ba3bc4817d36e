//! Error types for the HTTP layer.
//!
//! [`ApiError`] is what a request handler returns; it renders as a status
//! code and a `{"error": "..."}` body. [`BirdError`] covers starting and
//! running the server.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bird_auth::AuthError;
use bird_game::RulesError;
use bird_protocol::ProtocolError;
use bird_room::RoomError;
use bird_store::StoreError;
use serde_json::json;

use crate::config::ConfigError;

/// Why a request failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<RoomError> for ApiError {
    fn from(err: RoomError) -> Self {
        match err {
            RoomError::NotFound(_) => Self::NotFound(err.to_string()),
            RoomError::AlreadyExists(_) => Self::Conflict(err.to_string()),
        }
    }
}

impl From<RulesError> for ApiError {
    fn from(err: RulesError) -> Self {
        match err {
            RulesError::LobbyFull => Self::Conflict(err.to_string()),
            _ => Self::InvalidArgument(err.to_string()),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Unauthorized(err.to_string())
    }
}

impl From<ProtocolError> for ApiError {
    fn from(err: ProtocolError) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidArgument(rejection.body_text())
    }
}

/// Errors from building or running the server.
#[derive(Debug, thiserror::Error)]
pub enum BirdError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use bird_protocol::RoomId;

    use super::*;

    fn rid() -> RoomId {
        RoomId::parse("E1").unwrap()
    }

    #[test]
    fn test_room_errors_map_to_404_and_409() {
        assert_eq!(ApiError::from(RoomError::NotFound(rid())).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::from(RoomError::AlreadyExists(rid())).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_lobby_full_is_conflict_other_rules_are_bad_request() {
        assert_eq!(ApiError::from(RulesError::LobbyFull).status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::from(RulesError::NotYourTurn { expected: 2 }).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(RulesError::GameNotFinished).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_auth_error_is_unauthorized() {
        let err = ApiError::from(AuthError::Expired);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "auth token expired");
    }

    #[test]
    fn test_bad_room_id_is_bad_request() {
        let err = ApiError::from(ProtocolError::InvalidRoomId("a b".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_from_io_error() {
        let err: BirdError = std::io::Error::other("disk").into();
        assert!(matches!(err, BirdError::Io(_)));
        assert!(err.to_string().contains("disk"));
    }
}
