//! MessagePusher trait and the per-session outbound handle.
//!
//! Each session owns a bounded queue of encoded frames drained by its writer
//! task. A [`SessionHandle`] is the cloneable reference to that queue that the
//! registry hands out in snapshots; pushing never blocks, so fan-out is never
//! held up by a slow peer.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_util::sync::CancellationToken;

use chatline_shared::protocol::ServerMessage;

use super::{MessagePushError, SessionId, Username};

/// Why a frame could not be queued for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PushError {
    #[error("outbound queue is full")]
    QueueFull,

    #[error("session writer has shut down")]
    Closed,
}

/// Cloneable reference to one session's outbound queue.
///
/// `report_failure` cancels the session's token; the owning connection
/// handler watches that token and moves to Closing on its own.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: SessionId,
    sender: mpsc::Sender<Bytes>,
    failure: CancellationToken,
}

impl SessionHandle {
    pub fn new(id: SessionId, sender: mpsc::Sender<Bytes>, failure: CancellationToken) -> Self {
        Self {
            id,
            sender,
            failure,
        }
    }

    /// Create a handle together with the receiving end of its queue
    pub fn channel(
        id: SessionId,
        capacity: usize,
        failure: CancellationToken,
    ) -> (Self, mpsc::Receiver<Bytes>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(id, sender, failure), receiver)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Queue one encoded frame without waiting
    pub fn push(&self, frame: Bytes) -> Result<(), PushError> {
        self.sender.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => PushError::QueueFull,
            TrySendError::Closed(_) => PushError::Closed,
        })
    }

    /// Tell the owning handler that a delivery to this session failed
    pub fn report_failure(&self) {
        self.failure.cancel();
    }
}

/// Result of one fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Number of sessions the frame was queued for
    pub delivered: usize,
    /// Sessions whose queue rejected the frame
    pub failed: Vec<Username>,
}

/// MessagePusher trait
///
/// Delivers server messages to sessions. Implementations must keep each push
/// independent: one dead peer never aborts a broadcast.
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Push a message to a single session
    async fn push_to(
        &self,
        target: &SessionHandle,
        message: &ServerMessage,
    ) -> Result<(), MessagePushError>;

    /// Push a message to every registered session except `exclude`
    async fn broadcast(
        &self,
        message: &ServerMessage,
        exclude: Option<&Username>,
    ) -> Result<BroadcastReport, MessagePushError>;
}
