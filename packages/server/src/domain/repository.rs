//! ClientRegistry trait 定義
//!
//! The registry is the single source of truth for who is online. Every
//! operation is atomic with respect to the others; implementations hold their
//! lock only across in-memory map work, never across network I/O.

use async_trait::async_trait;

use super::{RegistryError, SessionHandle, Username};

/// Client Registry trait
///
/// The connection handlers and the broadcaster depend on this trait, not on
/// a concrete map, so the map can only be touched through these operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRegistry: Send + Sync {
    /// Insert `username` if absent, in one atomic step.
    ///
    /// On success returns the sorted roster (including `username`) taken under
    /// the same lock as the insert.
    async fn try_insert(
        &self,
        username: Username,
        handle: SessionHandle,
    ) -> Result<Vec<Username>, RegistryError>;

    /// Remove `username`; returns whether an entry was present
    async fn remove(&self, username: &Username) -> bool;

    /// Point-in-time copy of all entries, sorted by username
    async fn snapshot_all(&self) -> Vec<(Username, SessionHandle)>;

    /// Whether any session is registered
    async fn contains_any(&self) -> bool;

    /// Number of registered sessions
    async fn count(&self) -> usize;
}
