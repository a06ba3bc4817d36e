//! Per-room state management for Bird.
//!
//! A [`RoomManager`] holds the authoritative copy of every live room of one
//! kind, serializes all mutations on it, and pushes each committed value
//! to every [`Subscription`] open on that room.
//!
//! # Key types
//!
//! - [`Room`]: the trait each room kind implements
//! - [`RoomManager`]: the map of live rooms plus their subscribers
//! - [`Subscription`]: the receiving end one streaming task owns
//! - [`Observer`]: an ordered feed of commits and deletions (persistence)
//! - [`ManagerConfig`]: buffer sizing

mod config;
mod error;
mod manager;
mod room;
mod subscription;

pub use config::{DEFAULT_CHANNEL_CAPACITY, ManagerConfig};
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{Observer, Room};
pub use subscription::{Notice, Subscription, SubscriptionKey};
