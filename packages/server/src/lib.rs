//! TCP chat server library.
//!
//! Accepts concurrent TCP connections, admits each under a unique display
//! name and relays line-delimited JSON chat messages to every participant.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;

pub use config::ServerConfig;
pub use ui::{Server, ServerError};
