//! Chat wire protocol.
//!
//! One JSON object per frame, terminated by a single `\n`, over a persistent
//! TCP stream. Messages are split by direction: the server decodes
//! [`ClientMessage`] and encodes [`ServerMessage`], the client does the reverse.

pub mod codec;
pub mod message;
pub mod username;

pub use codec::{
    ClientCodec, CodecError, DEFAULT_MAX_FRAME_LENGTH, Decode, Decoded, FRAME_DELIMITER,
    FrameCodec, MalformedFrame, ServerCodec, decode, encode,
};
pub use message::{ClientMessage, ServerMessage, WELCOME_MESSAGE};
pub use username::{MAX_USERNAME_CHARS, UsernameError, validate_username};
