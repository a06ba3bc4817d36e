//! Shared application state: one room manager per phase plus the
//! collaborators every handler needs.

use std::sync::Arc;

use bird_auth::Authenticator;
use bird_game::{BidRoom, GameRoom, Lobby, RoomSnapshot};
use bird_protocol::RoomId;
use bird_room::{ManagerConfig, Observer, RoomManager};
use bird_store::{PersistQueue, Store, StoreError};
use tokio::sync::watch;

use crate::config::StreamConfig;

/// Cloned into every handler. Everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub lobbies: Arc<RoomManager<Lobby>>,
    pub bids: Arc<RoomManager<BidRoom>>,
    pub games: Arc<RoomManager<GameRoom>>,
    pub auth: Arc<dyn Authenticator>,
    pub stream: StreamConfig,
    shutdown: Arc<watch::Sender<bool>>,
}

impl AppState {
    /// Fresh, empty managers that keep rooms in memory only.
    pub fn new(auth: Arc<dyn Authenticator>, manager: ManagerConfig, stream: StreamConfig) -> Self {
        Self {
            lobbies: Arc::new(RoomManager::with_config(manager.clone())),
            bids: Arc::new(RoomManager::with_config(manager.clone())),
            games: Arc::new(RoomManager::with_config(manager)),
            auth,
            stream,
            shutdown: Arc::new(watch::Sender::new(false)),
        }
    }

    /// Fresh, empty managers whose every commit and deletion is queued to
    /// `persist`.
    pub fn persisted(
        auth: Arc<dyn Authenticator>,
        manager: ManagerConfig,
        stream: StreamConfig,
        persist: &PersistQueue,
    ) -> Self {
        fn observer<R>(persist: &PersistQueue) -> Arc<dyn Observer<R>>
        where
            PersistQueue: Observer<R>,
            R: bird_room::Room,
        {
            Arc::new(persist.clone())
        }

        Self {
            lobbies: Arc::new(
                RoomManager::with_config(manager.clone()).with_observer(observer(persist)),
            ),
            bids: Arc::new(
                RoomManager::with_config(manager.clone()).with_observer(observer(persist)),
            ),
            games: Arc::new(RoomManager::with_config(manager).with_observer(observer(persist))),
            auth,
            stream,
            shutdown: Arc::new(watch::Sender::new(false)),
        }
    }

    /// Loads every stored snapshot into the manager for its phase.
    ///
    /// Returns how many rooms were restored.
    pub async fn restore(&self, store: &dyn Store) -> Result<usize, StoreError> {
        let snapshots = store.list().await?;
        let count = snapshots.len();
        for snapshot in snapshots {
            tracing::debug!(room_id = %snapshot.id(), phase = snapshot.phase(), "restoring room");
            match snapshot {
                RoomSnapshot::Lobby(lobby) => self.lobbies.put(lobby).await,
                RoomSnapshot::Bidding(bids) => self.bids.put(bids).await,
                RoomSnapshot::Game(game) => self.games.put(game).await,
            }
        }
        Ok(count)
    }

    /// `true` if any phase has a live room with this ID.
    pub async fn id_in_use(&self, id: &RoomId) -> bool {
        self.lobbies.contains(id).await || self.bids.contains(id).await || self.games.contains(id).await
    }

    /// Tells every open event stream to end.
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Flips to `true` once [`begin_shutdown`](Self::begin_shutdown) is called.
    pub(crate) fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}
