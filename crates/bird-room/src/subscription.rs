//! The receiving side of a room subscription.
//!
//! Every registration is a pair of channels. The manager keeps the sending
//! halves ([`Subscriber`]); the streaming task that serves the client owns
//! the receiving halves ([`Subscription`]).
//!
//! ```text
//! RoomManager ──try_send(Arc<R>)──► updates (bounded mpsc) ──┐
//!             ──send(reason)──────► closed  (oneshot)   ──┴─► Subscription::next()
//! ```

use std::sync::Arc;

use bird_protocol::{CloseReason, RoomId, Viewer};
use tokio::sync::{mpsc, oneshot};

use crate::Room;

// ---------------------------------------------------------------------------
// Subscriber (manager side)
// ---------------------------------------------------------------------------

/// The manager's half of one registration.
///
/// Dropping it (eviction, replacement, unsubscribe) closes both channels,
/// which the matching [`Subscription`] reports as [`Notice::Dropped`].
pub(crate) struct Subscriber<R> {
    pub(crate) token: u64,
    pub(crate) updates: mpsc::Sender<Arc<R>>,
    pub(crate) close: oneshot::Sender<CloseReason>,
}

// ---------------------------------------------------------------------------
// Subscription (stream side)
// ---------------------------------------------------------------------------

/// What a subscription yields next.
#[derive(Debug)]
pub enum Notice<R> {
    /// A newly committed room value, in commit order.
    Update(Arc<R>),
    /// The room left the live map. Always the last notice.
    Closed(CloseReason),
    /// The registration was replaced, evicted, or removed, or the stream
    /// already ended.
    Dropped,
}

/// Identifies one registration, so a stream that ends can remove exactly
/// its own registration and not a newer one for the same subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionKey {
    pub room_id: RoomId,
    pub subscriber: String,
    pub token: u64,
}

/// A live feed of one room, as seen by one viewer.
///
/// The viewer is fixed when subscribing; it does not follow later seat
/// changes.
pub struct Subscription<R: Room> {
    room_id: RoomId,
    subscriber: String,
    viewer: Viewer,
    token: u64,
    updates: mpsc::Receiver<Arc<R>>,
    closed: oneshot::Receiver<CloseReason>,
    finished: bool,
}

impl<R: Room> Subscription<R> {
    pub(crate) fn new(
        room_id: RoomId,
        subscriber: String,
        viewer: Viewer,
        token: u64,
        updates: mpsc::Receiver<Arc<R>>,
        closed: oneshot::Receiver<CloseReason>,
    ) -> Self {
        Self {
            room_id,
            subscriber,
            viewer,
            token,
            updates,
            closed,
            finished: false,
        }
    }

    /// Waits for the next notice.
    ///
    /// Updates that were enqueued before the room closed are always
    /// yielded before [`Notice::Closed`]. Once a terminal notice has been
    /// returned, every later call returns [`Notice::Dropped`] immediately.
    ///
    /// Cancel-safe: dropping the future loses nothing.
    pub async fn next(&mut self) -> Notice<R> {
        if self.finished {
            return Notice::Dropped;
        }

        // `biased` polls the update queue first, so a close that races a
        // buffered update never overtakes it.
        let outcome = tokio::select! {
            biased;
            update = self.updates.recv() => match update {
                Some(room) => return Notice::Update(room),
                // Sender gone: the queue is drained, only the close remains.
                None => (&mut self.closed).await,
            },
            reason = &mut self.closed => reason,
        };

        self.finished = true;
        match outcome {
            Ok(reason) => Notice::Closed(reason),
            Err(_) => Notice::Dropped,
        }
    }

    /// The room this subscription follows.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// The identity this subscription was registered under.
    pub fn subscriber(&self) -> &str {
        &self.subscriber
    }

    /// How updates should be projected for this subscriber.
    pub fn viewer(&self) -> Viewer {
        self.viewer
    }

    /// Returns `true` once a terminal notice has been yielded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The key to pass to [`RoomManager::release`](crate::RoomManager::release).
    pub fn key(&self) -> SubscriptionKey {
        SubscriptionKey {
            room_id: self.room_id.clone(),
            subscriber: self.subscriber.clone(),
            token: self.token,
        }
    }
}

impl<R: Room> std::fmt::Debug for Subscription<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("room_id", &self.room_id)
            .field("subscriber", &self.subscriber)
            .field("viewer", &self.viewer)
            .field("token", &self.token)
            .field("finished", &self.finished)
            .finish()
    }
}
