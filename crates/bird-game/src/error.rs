//! Error types for the game rules.
//!
//! Every variant is a rejected move. A rejected move never changes the
//! room it was tried on.

use crate::{Card, Color};

/// A rule violation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RulesError {
    // -- lobby --
    #[error("lobby is full")]
    LobbyFull,

    #[error("{0} is not in this lobby")]
    NotInLobby(String),

    #[error("seat {0} does not exist")]
    SeatOutOfRange(usize),

    #[error("lobby needs four players to start")]
    LobbyNotFull,

    // -- bidding --
    #[error("bidding is over")]
    BiddingClosed,

    #[error("bidding is still open")]
    BiddingNotDone,

    #[error("{0} is not a player in this room")]
    NotAPlayer(String),

    #[error("it is seat {expected}'s turn")]
    NotYourTurn { expected: usize },

    #[error("seat {0} has already passed")]
    AlreadyPassed(usize),

    #[error("bid {0} is out of range")]
    InvalidBid(u32),

    // -- exchange --
    #[error("only the bid winner may do that")]
    NotBidWinner,

    #[error("trump has already been declared")]
    NotExchangePhase,

    #[error("invalid exchange: {0}")]
    InvalidExchange(String),

    #[error("{0} is not in the widow")]
    CardNotInWidow(Card),

    // -- play --
    #[error("trump has not been declared yet")]
    NotPlayPhase,

    #[error("{0} is not in your hand")]
    CardNotHeld(Card),

    #[error("must follow {0}")]
    MustFollowSuit(Color),

    #[error("the trick is complete and must be collected first")]
    TrickComplete,

    #[error("the trick needs four cards")]
    TrickIncomplete,

    #[error("the game is over")]
    GameFinished,

    #[error("the game is not over")]
    GameNotFinished,
}
