//! Ordered, off-the-request-path persistence.
//!
//! Handlers never wait on disk. Every commit is queued here and a single
//! background task applies the queue to the [`Store`] in order, so the
//! store always ends up with the last committed phase of each room.

use std::sync::Arc;

use bird_game::RoomSnapshot;
use bird_protocol::{CloseReason, RoomId};
use bird_room::{Observer, Room};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::Store;

enum Op {
    Save(Box<RoomSnapshot>),
    Remove(RoomId),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background writer. Cheap to clone.
///
/// The writer task stops once every handle has been dropped and the
/// queue has drained.
#[derive(Debug, Clone)]
pub struct PersistQueue {
    tx: mpsc::UnboundedSender<Op>,
}

impl PersistQueue {
    /// Starts the writer task on the current Tokio runtime.
    pub fn spawn(store: Arc<dyn Store>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_writer(store, rx));
        (Self { tx }, handle)
    }

    /// Queues a snapshot to be stored. Never blocks.
    pub fn save(&self, snapshot: RoomSnapshot) {
        if self.tx.send(Op::Save(Box::new(snapshot))).is_err() {
            tracing::warn!("persist queue closed, snapshot dropped");
        }
    }

    /// Queues removal of a room's snapshot. Never blocks.
    pub fn remove(&self, id: RoomId) {
        if self.tx.send(Op::Remove(id)).is_err() {
            tracing::warn!("persist queue closed, removal dropped");
        }
    }

    /// Waits until everything queued before this call has been applied.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Op::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run_writer(store: Arc<dyn Store>, mut rx: mpsc::UnboundedReceiver<Op>) {
    while let Some(op) = rx.recv().await {
        match op {
            Op::Save(snapshot) => {
                if let Err(e) = store.put(&snapshot).await {
                    tracing::warn!(room_id = %snapshot.id(), error = %e, "failed to persist room");
                }
            }
            Op::Remove(id) => {
                if let Err(e) = store.delete(&id).await {
                    tracing::warn!(room_id = %id, error = %e, "failed to remove persisted room");
                }
            }
            Op::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("persist writer stopped");
}

/// Plugged into a [`RoomManager`](bird_room::RoomManager), the queue sees
/// every commit in commit order.
///
/// A room closed with [`CloseReason::Continue`] keeps its file: the next
/// phase is already live under the same ID and has been saved over it.
impl<R> Observer<R> for PersistQueue
where
    R: Room + Into<RoomSnapshot>,
{
    fn committed(&self, room: &R) {
        self.save(room.clone().into());
    }

    fn deleted(&self, id: &RoomId, reason: CloseReason) {
        if reason == CloseReason::Delete {
            self.remove(id.clone());
        }
    }
}
