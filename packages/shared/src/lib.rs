//! Shared library for the Chatline server and client.
//!
//! Holds the wire protocol (message shapes, username rule, frame codec) and the
//! ambient utilities both binaries use (logging setup, clock).

pub mod logger;
pub mod protocol;
pub mod time;
