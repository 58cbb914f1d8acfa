//! Per-connection handlers.

mod connection;
mod writer;

pub use connection::ConnectionHandler;
