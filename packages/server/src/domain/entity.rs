//! Session entity and its lifecycle.

use std::net::SocketAddr;

use super::{SessionError, SessionHandle, SessionId, Timestamp, Username};

/// Lifecycle of one connection.
///
/// `Connecting → Joined → Closing → Closed`, with `Connecting → Closing` for a
/// failed handshake. There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Connecting,
    Joined,
    Closing,
    Closed,
}

impl SessionStatus {
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Connecting, Joined) | (Connecting, Closing) | (Joined, Closing) | (Closing, Closed)
        )
    }
}

/// Server-side state for one connected client.
///
/// Owned by its connection handler; the registry only holds a clone of the
/// [`SessionHandle`].
#[derive(Debug)]
pub struct ClientSession {
    id: SessionId,
    peer_addr: SocketAddr,
    handle: SessionHandle,
    username: Option<Username>,
    joined_at: Option<Timestamp>,
    status: SessionStatus,
}

impl ClientSession {
    pub fn new(peer_addr: SocketAddr, handle: SessionHandle) -> Self {
        Self {
            id: handle.id(),
            peer_addr,
            handle,
            username: None,
            joined_at: None,
            status: SessionStatus::Connecting,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn handle(&self) -> &SessionHandle {
        &self.handle
    }

    pub fn username(&self) -> Option<&Username> {
        self.username.as_ref()
    }

    pub fn joined_at(&self) -> Option<Timestamp> {
        self.joined_at
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Record a successful handshake
    pub fn mark_joined(
        &mut self,
        username: Username,
        joined_at: Timestamp,
    ) -> Result<(), SessionError> {
        self.transition(SessionStatus::Joined)?;
        self.username = Some(username);
        self.joined_at = Some(joined_at);
        Ok(())
    }

    /// Enter Closing; returns the username if the session had joined
    pub fn begin_closing(&mut self) -> Result<Option<Username>, SessionError> {
        self.transition(SessionStatus::Closing)?;
        Ok(self.username.clone())
    }

    pub fn close(&mut self) -> Result<(), SessionError> {
        self.transition(SessionStatus::Closed)
    }

    fn transition(&mut self, next: SessionStatus) -> Result<(), SessionError> {
        if !self.status.can_transition_to(next) {
            return Err(SessionError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        tracing::trace!(
            "Session {} transition {:?} -> {:?}",
            self.id,
            self.status,
            next
        );
        self.status = next;
        Ok(())
    }
}
