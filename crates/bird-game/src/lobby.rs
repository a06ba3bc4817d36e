//! Lobbies: four seats waiting to fill up.

use bird_protocol::{RoomId, SEATS, Viewer};
use bird_room::Room;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{BidRoom, RulesError};

/// What happened to a lobby after a player left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Someone is still seated.
    Remaining,
    /// The last player left; the lobby should be deleted.
    Emptied,
}

/// A table being assembled. An empty string is an open seat.
///
/// The host is always seated. When the host leaves, the lowest occupied
/// seat becomes host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lobby {
    pub id: RoomId,
    pub host: String,
    pub players: [String; SEATS],
}

impl Lobby {
    /// Creates a lobby with `host` in seat 0.
    pub fn new(id: RoomId, host: impl Into<String>) -> Self {
        let host = host.into();
        let mut players: [String; SEATS] = Default::default();
        players[0] = host.clone();
        Self { id, host, players }
    }

    pub fn has_player(&self, name: &str) -> bool {
        self.seat_of(name).is_some()
    }

    pub fn is_full(&self) -> bool {
        self.players.iter().all(|p| !p.is_empty())
    }

    pub fn seated(&self) -> usize {
        self.players.iter().filter(|p| !p.is_empty()).count()
    }

    /// Seats `name` in the first open seat and returns it. Joining a lobby
    /// you are already in returns your current seat.
    pub fn join(&mut self, name: &str) -> Result<usize, RulesError> {
        if let Some(seat) = self.seat_of(name) {
            return Ok(seat);
        }
        let seat = self
            .players
            .iter()
            .position(String::is_empty)
            .ok_or(RulesError::LobbyFull)?;
        self.players[seat] = name.to_string();
        if self.host.is_empty() {
            self.host = name.to_string();
        }
        Ok(seat)
    }

    /// Frees `name`'s seat, handing the host role on if needed.
    pub fn leave(&mut self, name: &str) -> Result<LeaveOutcome, RulesError> {
        let seat = self
            .seat_of(name)
            .ok_or_else(|| RulesError::NotInLobby(name.to_string()))?;
        self.players[seat].clear();

        let Some(next_host) = self.players.iter().find(|p| !p.is_empty()) else {
            self.host.clear();
            return Ok(LeaveOutcome::Emptied);
        };
        if self.host == name {
            self.host = next_host.clone();
        }
        Ok(LeaveOutcome::Remaining)
    }

    /// Exchanges two seats. Either may be open.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<(), RulesError> {
        for seat in [i, j] {
            if seat >= SEATS {
                return Err(RulesError::SeatOutOfRange(seat));
            }
        }
        self.players.swap(i, j);
        Ok(())
    }

    /// Deals a fresh hand and opens bidding. Needs all four seats filled.
    pub fn start_bidding<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<BidRoom, RulesError> {
        if !self.is_full() {
            return Err(RulesError::LobbyNotFull);
        }
        Ok(BidRoom::deal(self.id.clone(), self.players.clone(), rng))
    }
}

impl Room for Lobby {
    type View = Lobby;

    fn id(&self) -> &RoomId {
        &self.id
    }

    fn players(&self) -> &[String] {
        &self.players
    }

    /// Nothing in a lobby is secret.
    fn visible(&self, _viewer: Viewer) -> Lobby {
        self.clone()
    }
}
