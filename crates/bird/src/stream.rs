//! Live event streams.
//!
//! Each subscriber gets its own response body. The body pulls notices from
//! its [`Subscription`], projects each room for the viewer it subscribed
//! as, and writes [`Frame`]s. A keep-alive comment goes out whenever the
//! room has been quiet for one heartbeat period, so a dead peer is noticed
//! on the next write.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use bird_auth::Identity;
use bird_protocol::{Frame, RoomId};
use bird_room::{Notice, Room, RoomManager, Subscription, SubscriptionKey};
use tokio::sync::watch;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::config::StreamConfig;
use crate::error::ApiError;
use crate::state::AppState;

/// Subscribes `identity` to a room held by `manager` and returns the
/// streaming response.
///
/// # Errors
/// `NotFound` if the room is not live, `Forbidden` if `identity` may not
/// watch it.
pub async fn subscribe<R: Room>(
    app: &AppState,
    manager: &Arc<RoomManager<R>>,
    id: &RoomId,
    identity: &Identity,
) -> Result<Response, ApiError> {
    let room = manager
        .get(id)
        .await
        .ok_or_else(|| bird_room::RoomError::NotFound(id.clone()))?;
    let viewer = crate::routes::viewer(&room, identity)?;
    let subscription = manager.subscribe(id, identity.name.clone(), viewer).await?;

    let guard = ReleaseGuard {
        manager: Arc::clone(manager),
        key: subscription.key(),
    };
    Ok(event_stream(subscription, guard, app.stream, app.shutdown_signal()))
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

struct StreamState<R: Room> {
    subscription: Subscription<R>,
    heartbeat: Interval,
    shutdown: watch::Receiver<bool>,
    // Held until the body is dropped.
    _guard: ReleaseGuard<R>,
    done: bool,
}

fn event_stream<R: Room>(
    subscription: Subscription<R>,
    guard: ReleaseGuard<R>,
    config: StreamConfig,
    shutdown: watch::Receiver<bool>,
) -> Response {
    let period = config.heartbeat_period();
    let mut heartbeat = tokio::time::interval_at(Instant::now() + period, period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let state = StreamState {
        subscription,
        heartbeat,
        shutdown,
        _guard: guard,
        done: false,
    };

    let frames = futures_util::stream::unfold(state, |mut state| async move {
        let frame = next_frame(&mut state).await?;
        Some((Ok::<_, Infallible>(frame.encode()), state))
    });

    (
        [(CONTENT_TYPE, "text/event-stream"), (CACHE_CONTROL, "no-cache")],
        Body::from_stream(frames),
    )
        .into_response()
}

/// Waits for the next frame to write. `None` ends the body.
async fn next_frame<R: Room>(state: &mut StreamState<R>) -> Option<Frame> {
    if state.done || *state.shutdown.borrow() {
        return None;
    }
    loop {
        tokio::select! {
            notice = state.subscription.next() => match notice {
                Notice::Update(room) => {
                    let view = room.visible(state.subscription.viewer());
                    match Frame::update(&view) {
                        Ok(frame) => {
                            state.heartbeat.reset();
                            return Some(frame);
                        }
                        Err(err) => {
                            tracing::warn!(
                                room_id = %state.subscription.room_id(),
                                subscriber = state.subscription.subscriber(),
                                error = %err,
                                "failed to encode view, skipping update"
                            );
                        }
                    }
                }
                Notice::Closed(reason) => {
                    state.done = true;
                    return Some(Frame::Close(reason));
                }
                Notice::Dropped => {
                    tracing::debug!(
                        room_id = %state.subscription.room_id(),
                        subscriber = state.subscription.subscriber(),
                        "subscription dropped, ending stream"
                    );
                    return None;
                }
            },
            _ = state.heartbeat.tick() => return Some(Frame::Heartbeat),
            _ = state.shutdown.changed() => return None,
        }
    }
}

// ---------------------------------------------------------------------------
// Cleanup
// ---------------------------------------------------------------------------

/// Releases the registration when the response body goes away, which is
/// how a client disconnect reaches the manager.
struct ReleaseGuard<R: Room> {
    manager: Arc<RoomManager<R>>,
    key: SubscriptionKey,
}

impl<R: Room> Drop for ReleaseGuard<R> {
    fn drop(&mut self) {
        let manager = Arc::clone(&self.manager);
        let key = self.key.clone();
        // Drop can't be async, so spawn the cleanup. Outside a runtime
        // (process shutdown) there is nothing left to release.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if manager.release(&key).await {
                    tracing::info!(room_id = %key.room_id, subscriber = %key.subscriber, "stream closed");
                }
            });
        }
    }
}
