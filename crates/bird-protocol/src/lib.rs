//! Wire-level vocabulary for Bird.
//!
//! This crate defines the small set of values every other layer agrees on:
//!
//! - **Types** ([`RoomId`], [`Viewer`], [`CloseReason`]): which room, who
//!   is looking at it, and why a live stream ended.
//! - **Frames** ([`Frame`], [`FrameDecoder`]): how room updates are laid
//!   out on a `text/event-stream` response.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how snapshots are turned
//!   into bytes for storage.
//! - **Errors** ([`ProtocolError`]).
//!
//! It knows nothing about rooms, cards, or HTTP.

mod codec;
mod error;
mod frame;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use frame::{Frame, FrameDecoder};
pub use types::{
    CloseReason, GENERATED_ROOM_ID_LEN, MAX_ROOM_ID_LEN, RoomId, SEATS, Viewer,
};
