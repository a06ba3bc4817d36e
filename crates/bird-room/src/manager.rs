//! Room manager: holds live rooms, serializes writes, fans out updates.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bird_protocol::{CloseReason, RoomId, Viewer};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc, oneshot};

use crate::subscription::Subscriber;
use crate::{ManagerConfig, Observer, Room, RoomError, Subscription, SubscriptionKey};

/// One live room and everyone watching it.
struct Entry<R> {
    room: Arc<R>,
    subscribers: HashMap<String, Subscriber<R>>,
}

impl<R: Room> Entry<R> {
    fn new(room: Arc<R>) -> Self {
        Self {
            room,
            subscribers: HashMap::new(),
        }
    }

    /// Replaces the authoritative value and enqueues it to every subscriber.
    ///
    /// Never waits: a subscriber whose buffer is full is evicted, so one
    /// stalled client cannot hold up the room.
    fn commit(&mut self, room: Arc<R>) {
        self.room = Arc::clone(&room);
        let room_id = room.id();
        self.subscribers.retain(|name, sub| {
            match sub.updates.try_send(Arc::clone(&room)) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(%room_id, subscriber = %name, "subscriber fell behind, evicting");
                    false
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(%room_id, subscriber = %name, "subscriber gone, removing");
                    false
                }
            }
        });
    }
}

/// Manages every live room of one kind.
///
/// All operations take one async mutex around the room map. Nothing awaits
/// while holding it, so each operation is a short, totally ordered critical
/// section: two writes to the same room can never interleave, and every
/// subscriber sees writes in the order they were committed.
///
/// ```rust
/// # use bird_room::{Room, RoomManager};
/// # use bird_protocol::{RoomId, Viewer};
/// # #[derive(Clone)] struct Table { id: RoomId, players: Vec<String> }
/// # impl Room for Table {
/// #     type View = usize;
/// #     fn id(&self) -> &RoomId { &self.id }
/// #     fn players(&self) -> &[String] { &self.players }
/// #     fn visible(&self, _: Viewer) -> usize { self.players.len() }
/// # }
/// # tokio_test_block(async {
/// let manager = RoomManager::<Table>::new();
/// let id = RoomId::parse("T1").unwrap();
/// manager.put(Table { id: id.clone(), players: vec![] }).await;
///
/// let seats = manager
///     .update(&id, |t| -> Result<usize, bird_room::RoomError> {
///         t.players.push("alice".into());
///         Ok(t.players.len())
///     })
///     .await
///     .unwrap();
/// assert_eq!(seats, 1);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f);
/// # }
/// ```
pub struct RoomManager<R: Room> {
    rooms: Mutex<HashMap<RoomId, Entry<R>>>,
    config: ManagerConfig,
    next_token: AtomicU64,
    observer: Option<Arc<dyn Observer<R>>>,
}

impl<R: Room> RoomManager<R> {
    /// Creates an empty manager with default settings.
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Creates an empty manager with the given settings.
    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            config,
            next_token: AtomicU64::new(1),
            observer: None,
        }
    }

    /// Attaches an observer that sees every commit and deletion in order.
    pub fn with_observer(mut self, observer: Arc<dyn Observer<R>>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Returns the manager's settings.
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Returns an owned copy of the room, if it is live.
    pub async fn get(&self, id: &RoomId) -> Option<R> {
        let rooms = self.rooms.lock().await;
        rooms.get(id).map(|entry| R::clone(&entry.room))
    }

    /// Returns `true` if a room with this ID is live.
    pub async fn contains(&self, id: &RoomId) -> bool {
        self.rooms.lock().await.contains_key(id)
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    /// IDs of every live room, sorted.
    pub async fn room_ids(&self) -> Vec<RoomId> {
        let rooms = self.rooms.lock().await;
        let mut ids: Vec<RoomId> = rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Owned copies of every live room, sorted by ID.
    pub async fn rooms(&self) -> Vec<R> {
        let rooms = self.rooms.lock().await;
        let mut all: Vec<R> = rooms.values().map(|e| R::clone(&e.room)).collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        all
    }

    /// Number of open registrations on a room (0 if it is not live).
    pub async fn subscriber_count(&self, id: &RoomId) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.get(id).map_or(0, |entry| entry.subscribers.len())
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Stores `room` as the authoritative value for its ID and pushes it to
    /// every subscriber. Creates the entry if needed.
    pub async fn put(&self, room: R) {
        let room = Arc::new(room);
        let mut rooms = self.rooms.lock().await;
        let entry = rooms
            .entry(room.id().clone())
            .or_insert_with(|| Entry::new(Arc::clone(&room)));
        entry.commit(Arc::clone(&room));
        self.notify_committed(&room);
    }

    /// Inserts `room` only if its ID is not already live.
    ///
    /// # Errors
    /// [`RoomError::AlreadyExists`] if the ID is taken.
    pub async fn create(&self, room: R) -> Result<(), RoomError> {
        let room = Arc::new(room);
        let mut rooms = self.rooms.lock().await;
        let id = room.id().clone();
        if rooms.contains_key(&id) {
            return Err(RoomError::AlreadyExists(id));
        }
        rooms.insert(id.clone(), Entry::new(Arc::clone(&room)));
        self.notify_committed(&room);
        tracing::info!(room_id = %id, "room created");
        Ok(())
    }

    /// Read-modify-write under the manager's lock.
    ///
    /// `f` runs on a copy of the room. If it returns `Ok`, the copy is
    /// committed exactly like [`put`](Self::put). If it returns `Err`,
    /// nothing changes and no subscriber hears about it.
    ///
    /// `f` must not block; it runs inside the critical section.
    ///
    /// # Errors
    /// `E::from(RoomError::NotFound)` if the room is not live, or whatever
    /// `f` returns.
    pub async fn update<T, E, F>(&self, id: &RoomId, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut R) -> Result<T, E>,
        E: From<RoomError>,
    {
        let mut rooms = self.rooms.lock().await;
        let entry = rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;

        let mut next = R::clone(&entry.room);
        let output = f(&mut next)?;

        let next = Arc::new(next);
        entry.commit(Arc::clone(&next));
        self.notify_committed(&next);
        Ok(output)
    }

    /// Hands the current value of `id` to the observer again, as if it had
    /// just been committed. Subscribers are not notified.
    ///
    /// Used to restore a room's persisted state after another phase that
    /// shares its ID wrote over it and was then discarded.
    ///
    /// # Errors
    /// Returns `RoomError::NotFound` if the room is not live.
    pub async fn recommit(&self, id: &RoomId) -> Result<(), RoomError> {
        let rooms = self.rooms.lock().await;
        let entry = rooms.get(id).ok_or_else(|| RoomError::NotFound(id.clone()))?;
        self.notify_committed(&entry.room);
        Ok(())
    }

    /// Removes the room and sends `reason` to every subscriber.
    ///
    /// Returns the last committed value, or `None` if the room was not live.
    pub async fn delete(&self, id: &RoomId, reason: CloseReason) -> Option<R> {
        self.delete_if(id, reason, |_| true).await
    }

    /// Like [`delete`](Self::delete), but only if `pred` holds for the
    /// current value. The check and the removal happen under one lock, so
    /// no write can slip in between.
    pub async fn delete_if<F>(&self, id: &RoomId, reason: CloseReason, pred: F) -> Option<R>
    where
        F: FnOnce(&R) -> bool,
    {
        let entry = {
            let mut rooms = self.rooms.lock().await;
            if !pred(rooms.get(id)?.room.as_ref()) {
                return None;
            }
            let entry = rooms.remove(id)?;
            if let Some(observer) = &self.observer {
                observer.deleted(id, reason);
            }
            entry
        };

        let watchers = entry.subscribers.len();
        for (_, sub) in entry.subscribers {
            // The receiver may already be gone; that is fine.
            let _ = sub.close.send(reason);
        }
        tracing::info!(room_id = %id, %reason, watchers, "room closed");

        Some(Arc::unwrap_or_clone(entry.room))
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Registers `subscriber` on a live room.
    ///
    /// The current value is queued as the first update, so a new
    /// subscriber always starts from a full view. Subscribing again under
    /// the same name replaces the previous registration, whose
    /// subscription then ends with [`Notice::Dropped`](crate::Notice::Dropped).
    ///
    /// # Errors
    /// [`RoomError::NotFound`] if the room is not live.
    pub async fn subscribe(
        &self,
        id: &RoomId,
        subscriber: impl Into<String>,
        viewer: Viewer,
    ) -> Result<Subscription<R>, RoomError> {
        let subscriber = subscriber.into();
        let mut rooms = self.rooms.lock().await;
        let entry = rooms
            .get_mut(id)
            .ok_or_else(|| RoomError::NotFound(id.clone()))?;

        let (tx, rx) = mpsc::channel(self.config.capacity());
        let (close_tx, close_rx) = oneshot::channel();
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);

        // A fresh channel always has room for one value.
        let _ = tx.try_send(Arc::clone(&entry.room));

        let replaced = entry
            .subscribers
            .insert(
                subscriber.clone(),
                Subscriber {
                    token,
                    updates: tx,
                    close: close_tx,
                },
            )
            .is_some();

        tracing::info!(room_id = %id, %subscriber, %viewer, replaced, "subscribed");
        Ok(Subscription::new(
            id.clone(),
            subscriber,
            viewer,
            token,
            rx,
            close_rx,
        ))
    }

    /// Removes `subscriber`'s registration, if any. Returns whether one
    /// was removed.
    pub async fn unsubscribe(&self, id: &RoomId, subscriber: &str) -> bool {
        let mut rooms = self.rooms.lock().await;
        let removed = rooms
            .get_mut(id)
            .and_then(|entry| entry.subscribers.remove(subscriber))
            .is_some();
        if removed {
            tracing::debug!(room_id = %id, %subscriber, "unsubscribed");
        }
        removed
    }

    /// Removes the registration identified by `key`, but only if it has not
    /// been replaced since. Returns whether one was removed.
    pub async fn release(&self, key: &SubscriptionKey) -> bool {
        let mut rooms = self.rooms.lock().await;
        let Some(entry) = rooms.get_mut(&key.room_id) else {
            return false;
        };
        let current = entry
            .subscribers
            .get(&key.subscriber)
            .is_some_and(|sub| sub.token == key.token);
        if current {
            entry.subscribers.remove(&key.subscriber);
            tracing::debug!(room_id = %key.room_id, subscriber = %key.subscriber, "subscription released");
        }
        current
    }

    fn notify_committed(&self, room: &R) {
        if let Some(observer) = &self.observer {
            observer.committed(room);
        }
    }
}

impl<R: Room> Default for RoomManager<R> {
    fn default() -> Self {
        Self::new()
    }
}
