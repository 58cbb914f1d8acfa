//! UseCase layer: the server's application operations.

mod connect_participant;
mod disconnect_participant;
pub mod error;
mod send_message;

pub use connect_participant::{ConnectParticipantUseCase, JoinAccepted};
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{ConnectError, SendMessageError};
pub use send_message::SendMessageUseCase;
