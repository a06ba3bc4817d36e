//! Bidding routes: start a round from a full lobby, bid, watch.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use bird_game::{BidOutcome, BidView};
use bird_protocol::CloseReason;
use bird_room::{Room, RoomError};
use serde::Deserialize;

use super::{room_id, seat, viewer};
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::stream;

/// Deals a hand and moves a full lobby into bidding.
///
/// The bidding room goes live before the lobby closes with `continue`, so
/// a lobby subscriber that follows the event finds it.
pub async fn start(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<(StatusCode, Json<BidView>), ApiError> {
    let id = room_id(&raw)?;
    let lobby = state
        .lobbies
        .get(&id)
        .await
        .ok_or_else(|| RoomError::NotFound(id.clone()))?;
    let view_as = viewer(&lobby, &user)?;

    let bids = lobby.start_bidding(&mut rand::rng())?;
    state.bids.create(bids.clone()).await?;

    let closed = state
        .lobbies
        .delete_if(&id, CloseReason::Continue, |current| *current == lobby)
        .await;
    if closed.is_none() {
        // The lobby changed or vanished while we dealt. Drop the round and
        // re-save whatever lobby is left, since the round wrote over it.
        state.bids.delete(&id, CloseReason::Delete).await;
        if let Err(err) = state.lobbies.recommit(&id).await {
            tracing::debug!(room_id = %id, error = %err, "no lobby left to re-save");
        }
        return Err(ApiError::Conflict(format!("room {id} changed while starting, try again")));
    }

    tracing::info!(room_id = %id, started_by = %user.name, "bidding started");
    Ok((StatusCode::CREATED, Json(bids.visible(view_as))))
}

pub async fn get(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<BidView>, ApiError> {
    let id = room_id(&raw)?;
    let bids = state.bids.get(&id).await.ok_or(RoomError::NotFound(id))?;
    let view_as = viewer(&bids, &user)?;
    Ok(Json(bids.visible(view_as)))
}

pub async fn subscribe(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ApiError> {
    let id = room_id(&raw)?;
    stream::subscribe(&state, &state.bids, &id, &user).await
}

#[derive(Debug, Deserialize)]
pub struct BidRequest {
    pub amount: u32,
}

/// Submits the caller's bid. A bid at or below the standing bid is a pass.
///
/// The bid that closes the round also starts the game: the game room goes
/// live, then the bidding room closes with `continue`.
pub async fn bid(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
    body: Result<Json<BidRequest>, JsonRejection>,
) -> Result<Json<BidView>, ApiError> {
    let id = room_id(&raw)?;
    let Json(BidRequest { amount }) = body?;

    let (outcome, bids) = state
        .bids
        .update(&id, |bids| -> Result<_, ApiError> {
            seat(&*bids, &user)?;
            let outcome = bids.process_bid(&user.name, amount)?;
            Ok((outcome, bids.clone()))
        })
        .await?;
    tracing::debug!(
        room_id = %id,
        player = %user.name,
        amount,
        passed = outcome == BidOutcome::Passed,
        "bid accepted"
    );

    let view_as = viewer(&bids, &user)?;
    let view = bids.visible(view_as);

    if bids.done {
        let game = bids.into_game()?;
        tracing::info!(room_id = %id, bid_winner = game.bid_winner, bid = game.bid, "game started");
        state.games.put(game).await;
        state.bids.delete(&id, CloseReason::Continue).await;
    }
    Ok(Json(view))
}
