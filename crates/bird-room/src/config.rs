//! Room manager configuration.

use serde::{Deserialize, Serialize};

/// Default per-subscriber buffer, in room snapshots.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;

/// Tuning knobs for a [`RoomManager`](crate::RoomManager).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// How many undelivered snapshots a subscriber may fall behind by
    /// before it is evicted. Values below 1 are treated as 1.
    pub channel_capacity: usize,
}

impl ManagerConfig {
    pub(crate) fn capacity(&self) -> usize {
        self.channel_capacity.max(1)
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
