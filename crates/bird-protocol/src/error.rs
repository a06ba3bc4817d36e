//! Error types for the protocol layer.
//!
//! Each crate in Bird defines its own error enum. A `ProtocolError` always
//! means a problem with identifiers or serialization, never with room state
//! or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into JSON).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (malformed JSON, missing fields, wrong types).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A client-supplied room ID is empty, too long, or has characters
    /// outside `[A-Za-z0-9_-]`.
    #[error("invalid room id: {0:?}")]
    InvalidRoomId(String),
}
