//! Domain error types.

use thiserror::Error;

use chatline_shared::protocol::{CodecError, UsernameError};

use super::entity::SessionStatus;

/// Value object construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("message content must not be blank")]
    EmptyMessageContent,
}

/// Client registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
}

/// Session lifecycle errors.
///
/// Any of these is an internal invariant violation and ends the offending
/// session only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid session transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SessionStatus,
        to: SessionStatus,
    },
}

/// Message push errors
#[derive(Debug, Error)]
pub enum MessagePushError {
    #[error("failed to encode {kind} message: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: CodecError,
    },

    #[error("failed to push message to '{0}'")]
    PushFailed(String),
}
