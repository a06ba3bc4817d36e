//! Game routes: widow exchange, card play, tricks, score, close.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use bird_game::{Card, Color, GameView, RulesError, Score};
use bird_protocol::{CloseReason, Viewer};
use bird_room::{Room, RoomError};
use serde::{Deserialize, Serialize};

use super::{room_id, seat, viewer};
use crate::auth::CurrentUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::stream;

pub async fn get(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<GameView>, ApiError> {
    let id = room_id(&raw)?;
    let game = state.games.get(&id).await.ok_or(RoomError::NotFound(id))?;
    let view_as = viewer(&game, &user)?;
    Ok(Json(game.visible(view_as)))
}

pub async fn subscribe(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Response, ApiError> {
    let id = room_id(&raw)?;
    stream::subscribe(&state, &state.games, &id, &user).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequest {
    #[serde(default)]
    pub to_widow: Vec<Card>,
    #[serde(default)]
    pub from_widow: Vec<Card>,
    pub trump: Color,
}

/// Swaps cards with the widow and names trump in one step. Bid winner only.
pub async fn exchange(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
    body: Result<Json<ExchangeRequest>, JsonRejection>,
) -> Result<Json<GameView>, ApiError> {
    let id = room_id(&raw)?;
    let Json(request) = body?;
    let (view_as, game) = state
        .games
        .update(&id, |game| -> Result<_, ApiError> {
            let seat = seat(&*game, &user)?;
            game.exchange_with_widow(seat, &request.to_widow, &request.from_widow)?;
            game.declare_trump(seat, request.trump)?;
            Ok((Viewer::Seat(seat), game.clone()))
        })
        .await?;
    tracing::info!(
        room_id = %id,
        player = %user.name,
        exchanged = request.to_widow.len(),
        trump = %request.trump,
        "widow exchanged"
    );
    Ok(Json(game.visible(view_as)))
}

#[derive(Debug, Deserialize)]
pub struct PlayRequest {
    pub card: Card,
}

pub async fn play(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
    body: Result<Json<PlayRequest>, JsonRejection>,
) -> Result<Json<GameView>, ApiError> {
    let id = room_id(&raw)?;
    let Json(PlayRequest { card }) = body?;
    let (view_as, game) = state
        .games
        .update(&id, |game| -> Result<_, ApiError> {
            let seat = seat(&*game, &user)?;
            game.play_card(seat, card)?;
            Ok((Viewer::Seat(seat), game.clone()))
        })
        .await?;
    tracing::debug!(room_id = %id, player = %user.name, %card, "card played");
    Ok(Json(game.visible(view_as)))
}

#[derive(Debug, Serialize)]
pub struct TrickResponse {
    pub winner: usize,
    pub done: bool,
}

/// Collects a full trick. Any seated player (or an admin) may call it.
pub async fn trick(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<TrickResponse>, ApiError> {
    let id = room_id(&raw)?;
    let response = state
        .games
        .update(&id, |game| -> Result<_, ApiError> {
            viewer(&*game, &user)?;
            let winner = game.finish_trick()?;
            Ok(TrickResponse {
                winner,
                done: game.done,
            })
        })
        .await?;
    tracing::debug!(room_id = %id, winner = response.winner, done = response.done, "trick collected");
    Ok(Json(response))
}

pub async fn score(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<Json<Score>, ApiError> {
    let id = room_id(&raw)?;
    let game = state.games.get(&id).await.ok_or(RoomError::NotFound(id))?;
    viewer(&game, &user)?;
    Ok(Json(game.score()?))
}

/// Closes a finished game. Subscribers get a `delete` event.
pub async fn close(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = room_id(&raw)?;
    let game = state
        .games
        .get(&id)
        .await
        .ok_or_else(|| RoomError::NotFound(id.clone()))?;
    viewer(&game, &user)?;
    if !game.done {
        return Err(RulesError::GameNotFinished.into());
    }
    state
        .games
        .delete_if(&id, CloseReason::Delete, |game| game.done)
        .await
        .ok_or_else(|| RoomError::NotFound(id.clone()))?;
    tracing::info!(room_id = %id, closed_by = %user.name, "game closed");
    Ok(StatusCode::NO_CONTENT)
}
