//! UseCase error types.

use thiserror::Error;

use crate::domain::RegistryError;

/// Handshake registration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConnectError {
    #[error("username '{0}' is already taken")]
    UsernameTaken(String),
}

impl From<RegistryError> for ConnectError {
    fn from(error: RegistryError) -> Self {
        match error {
            RegistryError::UsernameTaken(username) => Self::UsernameTaken(username),
        }
    }
}

/// Chat relay errors
#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error("broadcast failed: {0}")]
    BroadcastFailed(String),
}
