//! Error types for the chat client.

use chatline_shared::protocol::{CodecError, UsernameError};
use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Username fails the local check; never sent to the server
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Server refused the join (name taken, invalid name, ...)
    #[error("Server rejected the join: {0}")]
    Rejected(String),

    /// TCP connect failed
    #[error("Connection error: {0}")]
    ConnectionError(#[source] std::io::Error),

    /// No reply to the join in time
    #[error("No response from server within {0} seconds")]
    HandshakeTimeout(u64),

    /// First reply was neither welcome nor error
    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    /// Server closed the connection
    #[error("Connection lost")]
    ConnectionLost,

    #[error(transparent)]
    Codec(#[from] CodecError),
}
