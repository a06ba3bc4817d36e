//! Room persistence for Bird.
//!
//! Live rooms are authoritative in memory. This crate keeps a copy of the
//! latest phase of each room somewhere durable so a restarted server can
//! pick up where it left off.
//!
//! - [`Store`]: async save/load/delete of [`RoomSnapshot`](bird_game::RoomSnapshot)s
//! - [`MemoryStore`], [`FileStore`]: implementations
//! - [`PersistQueue`]: the single ordered background writer

mod error;
mod queue;
mod store;

pub use error::StoreError;
pub use queue::PersistQueue;
pub use store::{FileStore, MemoryStore, Store};
