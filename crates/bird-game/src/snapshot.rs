//! A storable snapshot of any room, whatever phase it is in.

use bird_protocol::RoomId;
use bird_room::Room;
use serde::{Deserialize, Serialize};

use crate::{BidRoom, GameRoom, Lobby};

/// One room in one of its three phases.
///
/// Serialized with a `phase` tag:
///
/// ```json
/// { "phase": "bidding", "id": "ABCDEFGH", "players": [...], ... }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum RoomSnapshot {
    Lobby(Lobby),
    Bidding(BidRoom),
    Game(GameRoom),
}

impl RoomSnapshot {
    pub fn id(&self) -> &RoomId {
        match self {
            Self::Lobby(room) => room.id(),
            Self::Bidding(room) => room.id(),
            Self::Game(room) => room.id(),
        }
    }

    pub fn phase(&self) -> &'static str {
        match self {
            Self::Lobby(_) => "lobby",
            Self::Bidding(_) => "bidding",
            Self::Game(_) => "game",
        }
    }
}

impl From<Lobby> for RoomSnapshot {
    fn from(room: Lobby) -> Self {
        Self::Lobby(room)
    }
}

impl From<BidRoom> for RoomSnapshot {
    fn from(room: BidRoom) -> Self {
        Self::Bidding(room)
    }
}

impl From<GameRoom> for RoomSnapshot {
    fn from(room: GameRoom) -> Self {
        Self::Game(room)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_snapshot_json_is_tagged_with_phase() {
        let lobby = Lobby::new(RoomId::parse("S1").unwrap(), "alice");
        let json = serde_json::to_value(RoomSnapshot::from(lobby)).unwrap();
        assert_eq!(json["phase"], "lobby");
        assert_eq!(json["id"], "S1");
    }

    #[test]
    fn test_snapshot_restores_dealt_bidding_room() {
        let mut rng = StdRng::seed_from_u64(3);
        let room = BidRoom::deal(
            RoomId::parse("S2").unwrap(),
            ["a", "b", "c", "d"].map(String::from),
            &mut rng,
        );
        let snapshot = RoomSnapshot::from(room);

        let text = serde_json::to_string(&snapshot).unwrap();
        let back: RoomSnapshot = serde_json::from_str(&text).unwrap();

        assert_eq!(back, snapshot);
        assert_eq!(back.phase(), "bidding");
        assert_eq!(back.id().as_str(), "S2");
    }
}
