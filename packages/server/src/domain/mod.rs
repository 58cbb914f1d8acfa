//! Domain layer for the chat server.
//!
//! Value objects, the session entity and the traits (`ClientRegistry`,
//! `MessagePusher`) that the infrastructure layer implements.

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ClientSession, SessionStatus};
pub use error::{MessagePushError, RegistryError, SessionError, ValueObjectError};
pub use message_pusher::{BroadcastReport, MessagePusher, PushError, SessionHandle};
pub use repository::ClientRegistry;
pub use value_object::{MessageContent, SessionId, Timestamp, Username};

#[cfg(test)]
pub use repository::MockClientRegistry;
