//! HTTP routes under `/api`.
//!
//! Every mutating handler goes through [`RoomManager::update`] so the
//! membership check and the rule it guards run in one critical section.
//!
//! [`RoomManager::update`]: bird_room::RoomManager::update

mod bidding;
mod game;
mod lobby;

use axum::Router;
use axum::routing::{get, post, put};
use bird_auth::Identity;
use bird_protocol::{RoomId, Viewer};
use bird_room::Room;

use crate::error::ApiError;
use crate::state::AppState;

/// The `/api` router.
pub fn api() -> Router<AppState> {
    Router::new()
        .route("/lobbies", get(lobby::list).post(lobby::create))
        .route("/lobbies/:id", get(lobby::get).put(lobby::create_with_id))
        .route("/lobbies/:id/subscribe", get(lobby::subscribe))
        .route("/lobbies/:id/join", post(lobby::join))
        .route("/lobbies/:id/leave", post(lobby::leave))
        .route("/lobbies/:id/swap", post(lobby::swap))
        .route("/bidding/:id", put(bidding::start).get(bidding::get))
        .route("/bidding/:id/bid", post(bidding::bid))
        .route("/bidding/:id/subscribe", get(bidding::subscribe))
        .route("/games/:id", get(game::get).delete(game::close))
        .route("/games/:id/exchange", post(game::exchange))
        .route("/games/:id/play", post(game::play))
        .route("/games/:id/trick", post(game::trick))
        .route("/games/:id/score", get(game::score))
        .route("/games/:id/subscribe", get(game::subscribe))
}

/// Parses a room ID from the path.
pub(crate) fn room_id(raw: &str) -> Result<RoomId, ApiError> {
    Ok(RoomId::parse(raw)?)
}

/// How `identity` sees `room`, or `Forbidden` if they may not see it.
pub(crate) fn viewer<R: Room>(room: &R, identity: &Identity) -> Result<Viewer, ApiError> {
    room.viewer_for(&identity.name, identity.admin)
        .ok_or_else(|| ApiError::Forbidden(format!("{} is not in room {}", identity.name, room.id())))
}

/// The seat `identity` holds in `room`, or `Forbidden`.
pub(crate) fn seat<R: Room>(room: &R, identity: &Identity) -> Result<usize, ApiError> {
    room.seat_of(&identity.name)
        .ok_or_else(|| ApiError::Forbidden(format!("{} has no seat in room {}", identity.name, room.id())))
}
