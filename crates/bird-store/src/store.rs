//! The `Store` trait and its in-memory and on-disk implementations.

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bird_game::RoomSnapshot;
use bird_protocol::{Codec, JsonCodec, RoomId};
use tokio::sync::RwLock;

use crate::StoreError;

/// Durable home for room snapshots, one per room ID.
///
/// Writes replace whatever was stored for the same ID, so the store
/// always holds the latest phase of each table.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    async fn put(&self, snapshot: &RoomSnapshot) -> Result<(), StoreError>;

    async fn get(&self, id: &RoomId) -> Result<Option<RoomSnapshot>, StoreError>;

    /// Removing an ID that is not stored is not an error.
    async fn delete(&self, id: &RoomId) -> Result<(), StoreError>;

    /// Every stored snapshot, sorted by room ID.
    async fn list(&self) -> Result<Vec<RoomSnapshot>, StoreError>;
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// A [`Store`] that forgets everything on restart. For tests and
/// development.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rooms: RwLock<HashMap<RoomId, RoomSnapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn put(&self, snapshot: &RoomSnapshot) -> Result<(), StoreError> {
        self.rooms
            .write()
            .await
            .insert(snapshot.id().clone(), snapshot.clone());
        Ok(())
    }

    async fn get(&self, id: &RoomId) -> Result<Option<RoomSnapshot>, StoreError> {
        Ok(self.rooms.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &RoomId) -> Result<(), StoreError> {
        self.rooms.write().await.remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<RoomSnapshot>, StoreError> {
        let rooms = self.rooms.read().await;
        let mut all: Vec<RoomSnapshot> = rooms.values().cloned().collect();
        all.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(all)
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// A [`Store`] keeping one JSON file per room in a directory.
///
/// Each write goes to a temporary file that is then renamed over the
/// real one, so a crash mid-write never leaves a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    codec: JsonCodec,
}

const EXTENSION: &str = "json";

impl FileStore {
    /// Opens (creating if needed) a store rooted at `dir`.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self {
            dir,
            codec: JsonCodec,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &RoomId) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }
}

#[async_trait]
impl Store for FileStore {
    async fn put(&self, snapshot: &RoomSnapshot) -> Result<(), StoreError> {
        let bytes = self.codec.encode(snapshot)?;
        let path = self.path_for(snapshot.id());
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn get(&self, id: &RoomId) -> Result<Option<RoomSnapshot>, StoreError> {
        match tokio::fs::read(self.path_for(id)).await {
            Ok(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, id: &RoomId) -> Result<(), StoreError> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Files that fail to decode are skipped with a warning rather than
    /// failing the whole listing.
    async fn list(&self) -> Result<Vec<RoomSnapshot>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut all = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let bytes = tokio::fs::read(&path).await?;
            match self.codec.decode::<RoomSnapshot>(&bytes) {
                Ok(snapshot) => all.push(snapshot),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable snapshot");
                }
            }
        }
        all.sort_by(|a, b| a.id().cmp(b.id()));
        Ok(all)
    }
}
