//! The `Room` trait: what the manager needs to know about a room.
//!
//! The manager is written once and instantiated per room kind. Each kind
//! only has to say what its ID is, who is seated, and how it looks to a
//! given viewer.

use bird_protocol::{CloseReason, RoomId, Viewer};
use serde::Serialize;

/// A piece of per-room state the [`RoomManager`](crate::RoomManager) can
/// hold, mutate, and fan out.
///
/// `Clone` because mutations run on a copy that is only committed when the
/// mutation succeeds. `Send + Sync + 'static` because committed values are
/// shared with subscriber tasks through an `Arc`.
pub trait Room: Clone + Send + Sync + 'static {
    /// The redacted projection a single viewer receives.
    type View: Serialize + Send + 'static;

    /// The room's ID. Never changes over the room's life.
    fn id(&self) -> &RoomId;

    /// Seat order. An empty string is an open seat.
    fn players(&self) -> &[String];

    /// Projects the room for `viewer`, hiding what they may not see.
    fn visible(&self, viewer: Viewer) -> Self::View;

    /// Returns the seat `name` occupies, if any.
    fn seat_of(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.players().iter().position(|p| p == name)
    }

    /// Decides how `name` sees this room.
    ///
    /// A seated player always sees as their seat, even if they are also an
    /// admin. An unseated admin sees everything. Anyone else sees nothing.
    fn viewer_for(&self, name: &str, admin: bool) -> Option<Viewer> {
        match self.seat_of(name) {
            Some(seat) => Some(Viewer::Seat(seat)),
            None if admin => Some(Viewer::Admin),
            None => None,
        }
    }
}

/// Receives every change the manager commits, inside the manager's
/// critical section and therefore in commit order.
///
/// Implementations must not block; hand work off to a queue instead.
pub trait Observer<R: Room>: Send + Sync + 'static {
    /// A new value for `room.id()` was committed by `put`, `create` or
    /// `update`.
    fn committed(&self, room: &R);

    /// The room left the live map with `reason`.
    fn deleted(&self, id: &RoomId, reason: CloseReason);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Table {
        id: RoomId,
        players: Vec<String>,
    }

    impl Room for Table {
        type View = usize;

        fn id(&self) -> &RoomId {
            &self.id
        }

        fn players(&self) -> &[String] {
            &self.players
        }

        fn visible(&self, _viewer: Viewer) -> usize {
            self.players.len()
        }
    }

    fn table() -> Table {
        Table {
            id: RoomId::parse("T").unwrap(),
            players: vec!["alice".into(), String::new(), "bob".into(), String::new()],
        }
    }

    #[test]
    fn test_seat_of_finds_seated_player() {
        assert_eq!(table().seat_of("bob"), Some(2));
        assert_eq!(table().seat_of("carol"), None);
    }

    #[test]
    fn test_seat_of_empty_name_is_never_seated() {
        assert_eq!(table().seat_of(""), None);
    }

    #[test]
    fn test_viewer_for_seated_admin_sees_as_seat() {
        assert_eq!(table().viewer_for("alice", true), Some(Viewer::Seat(0)));
    }

    #[test]
    fn test_viewer_for_unseated_admin_sees_everything() {
        assert_eq!(table().viewer_for("root", true), Some(Viewer::Admin));
    }

    #[test]
    fn test_viewer_for_stranger_is_none() {
        assert_eq!(table().viewer_for("mallory", false), None);
    }
}
