//! Error types for the store layer.

use bird_protocol::ProtocolError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing storage failed.
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot could not be encoded, or a stored one could not be read back.
    #[error("store codec failed: {0}")]
    Codec(#[from] ProtocolError),
}
