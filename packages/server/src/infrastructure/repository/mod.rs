//! Client registry implementations.

pub mod inmemory;

pub use inmemory::InMemoryClientRegistry;
