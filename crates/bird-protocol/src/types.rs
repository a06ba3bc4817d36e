//! Core identity types shared by every layer of Bird.
//!
//! These are the small values that travel between the HTTP layer, the
//! room manager, and the game rules: which room, who is looking at it,
//! and why a live stream ended.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// Number of seats at every table.
pub const SEATS: usize = 4;

/// Length of a generated room ID.
pub const GENERATED_ROOM_ID_LEN: usize = 8;

/// Longest room ID a client may choose.
pub const MAX_ROOM_ID_LEN: usize = 32;

const ROOM_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// A unique identifier for a room.
///
/// The same ID follows a table through its whole life: the lobby, the
/// bidding round, and the game all share it, so a client only ever needs
/// to remember one string.
///
/// `#[serde(transparent)]` keeps the JSON form a plain string
/// (`"ABCDEFGH"`), not `{ "0": "ABCDEFGH" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Validates a client-supplied room ID.
    ///
    /// Accepts 1 to [`MAX_ROOM_ID_LEN`] ASCII letters, digits, `-` or `_`.
    /// The ID ends up in URLs and file names, so anything else is rejected.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        if raw.is_empty() || raw.len() > MAX_ROOM_ID_LEN {
            return Err(ProtocolError::InvalidRoomId(raw.to_string()));
        }
        let valid = raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(ProtocolError::InvalidRoomId(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    /// Generates a random 8-letter uppercase room ID.
    ///
    /// Callers that need a *free* ID retry against their own room map;
    /// 26^8 possibilities makes a collision unlikely but not impossible.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let id = (0..GENERATED_ROOM_ID_LEN)
            .map(|_| {
                let i = rng.random_range(0..ROOM_ID_ALPHABET.len());
                ROOM_ID_ALPHABET[i] as char
            })
            .collect();
        Self(id)
    }

    /// Returns the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for RoomId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Viewer
// ---------------------------------------------------------------------------

/// Who a projected view is being built for.
///
/// A seated player sees their own private information and only counts
/// for everyone else. `Admin` is the override that sees the whole table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Viewer {
    /// The player in this seat (0..4).
    Seat(usize),
    /// Sees everything, including other hands and the widow.
    Admin,
}

impl Viewer {
    /// Returns the seat index, or `None` for an admin viewer.
    pub fn seat(self) -> Option<usize> {
        match self {
            Self::Seat(seat) => Some(seat),
            Self::Admin => None,
        }
    }

    /// Returns `true` if this viewer may see every hidden card.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seat(seat) => write!(f, "seat-{seat}"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

// ---------------------------------------------------------------------------
// CloseReason
// ---------------------------------------------------------------------------

/// Why a room's live streams were closed.
///
/// Sent exactly once to every subscriber when a room leaves its live map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloseReason {
    /// The room moved on to its next phase (lobby → bidding → game).
    /// Clients should subscribe to the successor room under the same ID.
    Continue,
    /// The room is gone. Clients should go back to the lobby browser.
    Delete,
}

impl CloseReason {
    /// The event name used on the wire for this reason.
    pub fn event_name(self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for CloseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

// =========================================================================
// Tests
// =========================================================================
