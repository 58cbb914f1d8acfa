//! Newline-delimited JSON frame codec.
//!
//! A frame is one JSON-encoded message followed by a single `\n`. JSON escapes
//! newlines inside strings, so the boundary byte never appears unescaped in a
//! payload.
//!
//! [`encode`] and [`decode`] are the building blocks; [`FrameCodec`] wraps them
//! in the `tokio_util` codec traits so a socket half can be turned into a
//! `FramedRead` / `FramedWrite`.

use std::{fmt, io, marker::PhantomData};

use bytes::{BufMut, Bytes, BytesMut};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio_util::codec::{Decoder, Encoder};

use super::message::{ClientMessage, ServerMessage};

/// Frame boundary marker
pub const FRAME_DELIMITER: u8 = b'\n';

/// Default upper bound for a single frame, boundary included
pub const DEFAULT_MAX_FRAME_LENGTH: usize = 64 * 1024;

/// Transport-level codec errors. Any of these ends the connection.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("frame exceeds maximum length of {max} bytes")]
    FrameTooLong { max: usize },

    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// A complete frame whose payload is not a known message shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedFrame {
    /// The consumed bytes, boundary included
    pub bytes: Bytes,
    /// Parser diagnostic, for logging
    pub reason: String,
}

impl fmt::Display for MalformedFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.reason, self.bytes.len())
    }
}

/// Outcome of a single [`decode`] call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decode<T> {
    /// One frame was consumed and parsed
    Message(T),
    /// No boundary yet; nothing was consumed
    Incomplete,
    /// One frame was consumed but did not parse
    Malformed(MalformedFrame),
}

/// Item yielded by [`FrameCodec`] as a `Decoder`.
///
/// Malformed frames are items rather than errors so that a `FramedRead` keeps
/// going after one; only transport failures end the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded<T> {
    Message(T),
    Malformed(MalformedFrame),
}

/// Encode a message as one frame (JSON payload plus boundary byte).
pub fn encode<T: Serialize>(message: &T) -> Result<Bytes, CodecError> {
    let mut buf = serde_json::to_vec(message)?;
    buf.push(FRAME_DELIMITER);
    Ok(Bytes::from(buf))
}

/// Decode at most one frame from the front of `buf`.
///
/// Call repeatedly until [`Decode::Incomplete`]; a single read may carry zero,
/// one or many frames.
pub fn decode<T: DeserializeOwned>(buf: &mut BytesMut) -> Decode<T> {
    match find_delimiter(buf, 0) {
        Some(boundary) => take_frame(buf, boundary).into(),
        None => Decode::Incomplete,
    }
}

/// Position of the first boundary byte at or after `from`
fn find_delimiter(buf: &[u8], from: usize) -> Option<usize> {
    buf[from..]
        .iter()
        .position(|byte| *byte == FRAME_DELIMITER)
        .map(|offset| from + offset)
}

/// Split off `buf[..=boundary]` and parse it
fn take_frame<T: DeserializeOwned>(buf: &mut BytesMut, boundary: usize) -> Decoded<T> {
    let frame = buf.split_to(boundary + 1).freeze();
    match serde_json::from_slice::<T>(&frame[..boundary]) {
        Ok(message) => Decoded::Message(message),
        Err(e) => Decoded::Malformed(MalformedFrame {
            bytes: frame,
            reason: e.to_string(),
        }),
    }
}

impl<T> From<Decoded<T>> for Decode<T> {
    fn from(decoded: Decoded<T>) -> Self {
        match decoded {
            Decoded::Message(message) => Decode::Message(message),
            Decoded::Malformed(frame) => Decode::Malformed(frame),
        }
    }
}

/// `tokio_util` codec decoding `D` and encoding `E`.
pub struct FrameCodec<D, E> {
    max_frame_length: usize,
    /// Bytes of the buffered partial frame already searched for a boundary
    next_index: usize,
    _marker: PhantomData<fn() -> (D, E)>,
}

/// Codec used by the server: decodes client messages, encodes server messages
pub type ServerCodec = FrameCodec<ClientMessage, ServerMessage>;

/// Codec used by the client: decodes server messages, encodes client messages
pub type ClientCodec = FrameCodec<ServerMessage, ClientMessage>;

impl<D, E> FrameCodec<D, E> {
    pub fn new() -> Self {
        Self::with_max_frame_length(DEFAULT_MAX_FRAME_LENGTH)
    }

    pub fn with_max_frame_length(max_frame_length: usize) -> Self {
        Self {
            max_frame_length,
            next_index: 0,
            _marker: PhantomData,
        }
    }
}

impl<D, E> Default for FrameCodec<D, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D, E> fmt::Debug for FrameCodec<D, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameCodec")
            .field("max_frame_length", &self.max_frame_length)
            .finish()
    }
}

impl<D: DeserializeOwned, E> Decoder for FrameCodec<D, E> {
    type Item = Decoded<D>;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        // resume where the previous call stopped so a trickled frame is scanned once
        let scan_from = self.next_index.min(src.len());
        match find_delimiter(src, scan_from) {
            Some(boundary) => {
                self.next_index = 0;
                Ok(Some(take_frame(src, boundary)))
            }
            None if src.len() > self.max_frame_length => {
                self.next_index = 0;
                Err(CodecError::FrameTooLong {
                    max: self.max_frame_length,
                })
            }
            None => {
                self.next_index = src.len();
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(buf)? {
            Some(item) => Ok(Some(item)),
            None => {
                if !buf.is_empty() {
                    tracing::debug!(
                        "Discarding {} bytes of partial frame at end of stream",
                        buf.len()
                    );
                    buf.clear();
                }
                self.next_index = 0;
                Ok(None)
            }
        }
    }
}

impl<D, E: Serialize> Encoder<E> for FrameCodec<D, E> {
    type Error = CodecError;

    fn encode(&mut self, item: E, dst: &mut BytesMut) -> Result<(), Self::Error> {
        serde_json::to_writer(BufMut::writer(&mut *dst), &item)?;
        dst.put_u8(FRAME_DELIMITER);
        Ok(())
    }
}
