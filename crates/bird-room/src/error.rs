//! Error types for the room layer.

use bird_protocol::RoomId;

/// Errors that can occur during room manager operations.
///
/// Rule violations inside a room are the caller's error type; the manager
/// only reports whether the room itself is there.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// No live room has this ID.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// A live room already has this ID.
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),
}
