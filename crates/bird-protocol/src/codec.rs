//! Codec trait and implementations for serializing/deserializing values.
//!
//! A "codec" (coder/decoder) converts between Rust types and raw bytes.
//! The snapshot store doesn't care HOW a room is serialized; it just needs
//! something that implements [`Codec`].

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` so a codec can live inside a store that is
/// shared across Tokio worker threads.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Snapshot files written with this codec are human-readable, so an
/// operator can inspect a stuck table with `cat`.
///
/// ## Example
///
/// ```rust
/// use bird_protocol::{Codec, JsonCodec, RoomId};
///
/// let codec = JsonCodec;
/// let id = RoomId::parse("TABLE").unwrap();
///
/// let bytes = codec.encode(&id).unwrap();
/// assert_eq!(bytes, b"\"TABLE\"");
///
/// let decoded: RoomId = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, id);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec_pretty(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Seating {
        host: String,
        players: Vec<String>,
    }

    #[test]
    fn test_json_codec_decodes_what_it_encodes() {
        let codec = JsonCodec;
        let seating = Seating {
            host: "alice".into(),
            players: vec!["alice".into(), String::new()],
        };
        let bytes = codec.encode(&seating).unwrap();
        let decoded: Seating = codec.decode(&bytes).unwrap();
        assert_eq!(decoded, seating);
    }

    #[test]
    fn test_json_codec_decode_garbage_returns_decode_error() {
        let result: Result<Seating, _> = JsonCodec.decode(b"{not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_decode_missing_field_returns_decode_error() {
        let result: Result<Seating, _> = JsonCodec.decode(br#"{"host":"a"}"#);
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
