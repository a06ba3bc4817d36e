//! Lobby routes: create, join, leave, reorder seats, watch.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use bird_game::{LeaveOutcome, Lobby};
use bird_protocol::{CloseReason, RoomId};
use bird_room::RoomError;
use serde::Deserialize;

use super::{room_id, viewer};
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::stream;

/// How many generated IDs to try before giving up.
const GENERATE_ATTEMPTS: usize = 16;

/// Lobbies that still have an open seat.
pub async fn list(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Json<Vec<Lobby>> {
    let open = state
        .lobbies
        .rooms()
        .await
        .into_iter()
        .filter(|lobby| !lobby.is_full())
        .collect();
    Json(open)
}

/// Creates a lobby under a fresh generated ID with the caller as host.
pub async fn create(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<Lobby>), ApiError> {
    for _ in 0..GENERATE_ATTEMPTS {
        let id = RoomId::generate();
        if state.id_in_use(&id).await {
            continue;
        }
        let lobby = Lobby::new(id, user.name.clone());
        match state.lobbies.create(lobby.clone()).await {
            Ok(()) => return Ok((StatusCode::CREATED, Json(lobby))),
            Err(RoomError::AlreadyExists(_)) => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(ApiError::Internal("could not find a free room id".into()))
}

/// Creates a lobby under the ID in the path.
pub async fn create_with_id(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<(StatusCode, Json<Lobby>), ApiError> {
    let id = room_id(&raw)?;
    if state.id_in_use(&id).await {
        return Err(RoomError::AlreadyExists(id).into());
    }
    let lobby = Lobby::new(id, user.name);
    state.lobbies.create(lobby.clone()).await?;
    Ok((StatusCode::CREATED, Json(lobby)))
}

pub async fn get(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Lobby>, ApiError> {
    let id = room_id(&raw)?;
    let lobby = state
        .lobbies
        .get(&id)
        .await
        .ok_or(RoomError::NotFound(id))?;
    viewer(&lobby, &user)?;
    Ok(Json(lobby))
}

pub async fn subscribe(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ApiError> {
    let id = room_id(&raw)?;
    stream::subscribe(&state, &state.lobbies, &id, &user).await
}

/// Seats the caller in the first open seat.
pub async fn join(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Lobby>, ApiError> {
    let id = room_id(&raw)?;
    let (seat, lobby) = state
        .lobbies
        .update(&id, |lobby| -> Result<_, ApiError> {
            let seat = lobby.join(&user.name)?;
            Ok((seat, lobby.clone()))
        })
        .await?;
    tracing::info!(room_id = %id, player = %user.name, seat, "joined lobby");
    Ok(Json(lobby))
}

/// Frees the caller's seat. The last player out deletes the lobby.
pub async fn leave(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = room_id(&raw)?;
    let outcome = state
        .lobbies
        .update(&id, |lobby| -> Result<_, ApiError> { Ok(lobby.leave(&user.name)?) })
        .await?;
    state.lobbies.unsubscribe(&id, &user.name).await;
    tracing::info!(room_id = %id, player = %user.name, "left lobby");

    if outcome == LeaveOutcome::Emptied {
        // Someone may have joined since; only an empty lobby goes.
        state
            .lobbies
            .delete_if(&id, CloseReason::Delete, |lobby| lobby.seated() == 0)
            .await;
    }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct SwapRequest {
    pub i: usize,
    pub j: usize,
}

/// Exchanges two seats. Host or admin only.
pub async fn swap(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
    body: Result<Json<SwapRequest>, JsonRejection>,
) -> Result<Json<Lobby>, ApiError> {
    let id = room_id(&raw)?;
    let Json(SwapRequest { i, j }) = body?;
    let lobby = state
        .lobbies
        .update(&id, |lobby| -> Result<_, ApiError> {
            if lobby.host != user.name && !user.admin {
                return Err(ApiError::Forbidden(format!(
                    "only the host may reorder room {}",
                    lobby.id
                )));
            }
            lobby.swap(i, j)?;
            Ok(lobby.clone())
        })
        .await?;
    Ok(Json(lobby))
}
