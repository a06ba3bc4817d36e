//! Live-stream framing.
//!
//! A subscription is delivered as a `text/event-stream` body. Each
//! [`Frame`] is one event on that stream:
//!
//! ```text
//! event: update
//! data: {"id":"ABCDEFGH","host":"alice",...}
//!
//! event: continue
//!
//! : keep-alive
//!
//! ```
//!
//! [`FrameDecoder`] does the reverse for Rust clients: feed it chunks as
//! they arrive off the socket and it hands back every complete frame.

use serde::Serialize;

use crate::{CloseReason, ProtocolError};

/// One event on a live stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A fresh projected view of the room, already serialized to JSON.
    Update { data: String },
    /// Terminal event. Nothing follows it on the same stream.
    Close(CloseReason),
    /// Comment line that keeps intermediaries from timing the stream out
    /// and makes a write fail promptly when the peer is gone.
    Heartbeat,
}

impl Frame {
    /// Serializes `view` into an update frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if `view` cannot be serialized.
    #[cfg(feature = "json")]
    pub fn update<T: Serialize>(view: &T) -> Result<Self, ProtocolError> {
        let data = serde_json::to_string(view).map_err(ProtocolError::Encode)?;
        Ok(Self::Update { data })
    }

    /// Returns `true` for frames that end the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Close(_))
    }

    /// Renders the frame in `text/event-stream` syntax, including the
    /// blank line that terminates it.
    pub fn encode(&self) -> String {
        match self {
            Self::Update { data } => {
                let mut out = String::with_capacity(data.len() + 24);
                out.push_str("event: update\n");
                // A `data:` field cannot contain a raw newline.
                for line in data.split('\n') {
                    out.push_str("data: ");
                    out.push_str(line);
                    out.push('\n');
                }
                out.push('\n');
                out
            }
            Self::Close(reason) => format!("event: {}\n\n", reason.event_name()),
            Self::Heartbeat => ": keep-alive\n\n".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// FrameDecoder
// ---------------------------------------------------------------------------

/// Incremental parser for a `text/event-stream` body.
///
/// Chunks from the network rarely line up with event boundaries, or even
/// with UTF-8 character boundaries, so the decoder buffers raw bytes
/// between calls to [`push`](Self::push) and only decodes an event once
/// its terminating blank line has arrived. Events with an unrecognized
/// name, or that are not valid UTF-8, are skipped.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
}

impl FrameDecoder {
    /// Creates an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every frame it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buf.extend(chunk.iter().copied().filter(|&b| b != b'\r'));

        let mut frames = Vec::new();
        while let Some(end) = find_blank_line(&self.buf) {
            let block: Vec<u8> = self.buf.drain(..end + 2).collect();
            match std::str::from_utf8(&block) {
                Ok(text) => {
                    if let Some(frame) = parse_block(text.trim_end_matches('\n')) {
                        frames.push(frame);
                    }
                }
                Err(err) => tracing::warn!(error = %err, "skipping event that is not valid UTF-8"),
            }
        }
        frames
    }

    /// Returns `true` if a partial event is still buffered.
    pub fn has_partial(&self) -> bool {
        !self.buf.is_empty()
    }
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

fn parse_block(block: &str) -> Option<Frame> {
    let mut event: Option<&str> = None;
    let mut data: Vec<&str> = Vec::new();
    let mut comment = false;

    for line in block.split('\n') {
        if line.starts_with(':') {
            comment = true;
            continue;
        }
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value),
            "data" => data.push(value),
            _ => {}
        }
    }

    match event {
        Some("update") => Some(Frame::Update { data: data.join("\n") }),
        Some("continue") => Some(Frame::Close(CloseReason::Continue)),
        Some("delete") => Some(Frame::Close(CloseReason::Delete)),
        Some(_) => None,
        None if !data.is_empty() => Some(Frame::Update { data: data.join("\n") }),
        None if comment => Some(Frame::Heartbeat),
        None => None,
    }
}

// =========================================================================
// Tests
// =========================================================================
