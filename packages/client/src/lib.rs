//! Interactive TCP chat client with reconnection support.

pub mod command;
pub mod domain;
pub mod error;
pub mod formatter;
mod runner;
pub mod session;
mod ui;

pub use error::ClientError;
pub use runner::run_client;
