//! Rook-style card rules and room state for Bird.
//!
//! A table moves through three room kinds under one ID:
//!
//! ```text
//! Lobby ──start_bidding──► BidRoom ──into_game──► GameRoom
//! ```
//!
//! Each kind implements [`bird_room::Room`] so a generic manager can hold
//! it, and projects itself per viewer through the types in [`view`].

mod bidding;
pub mod cards;
mod error;
mod game;
mod lobby;
mod snapshot;
pub mod view;

pub use bidding::{BidOutcome, BidRoom};
pub use cards::{Card, Color};
pub use error::RulesError;
pub use game::{GameRoom, Score, team_of};
pub use lobby::{LeaveOutcome, Lobby};
pub use snapshot::RoomSnapshot;
pub use view::{BidView, GameView};
