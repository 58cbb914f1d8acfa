//! Registry-backed MessagePusher 実装
//!
//! ## 責務
//!
//! - メッセージを一度だけエンコードし、レジストリのスナップショットに含まれる
//!   全セッションのキューへ push する
//! - 送信失敗はそのセッションのハンドラへ通知するだけで、レジストリは変更しない
//!
//! Removal stays with the connection handler that owns the session, so there
//! is exactly one code path mutating the registry for any given session.

use std::sync::Arc;

use async_trait::async_trait;

use chatline_shared::protocol::{ServerMessage, encode};

use crate::domain::{
    BroadcastReport, ClientRegistry, MessagePushError, MessagePusher, SessionHandle, Username,
};

/// Fan-out over a [`ClientRegistry`] snapshot
pub struct Broadcaster {
    registry: Arc<dyn ClientRegistry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<dyn ClientRegistry>) -> Self {
        Self { registry }
    }
}

fn encode_message(message: &ServerMessage) -> Result<bytes::Bytes, MessagePushError> {
    encode(message).map_err(|source| MessagePushError::Encode {
        kind: message.kind(),
        source,
    })
}

#[async_trait]
impl MessagePusher for Broadcaster {
    async fn push_to(
        &self,
        target: &SessionHandle,
        message: &ServerMessage,
    ) -> Result<(), MessagePushError> {
        let frame = encode_message(message)?;
        target.push(frame).map_err(|e| {
            tracing::warn!(
                "Failed to push {} to session {}: {}",
                message.kind(),
                target.id(),
                e
            );
            target.report_failure();
            MessagePushError::PushFailed(target.id().to_string())
        })
    }

    async fn broadcast(
        &self,
        message: &ServerMessage,
        exclude: Option<&Username>,
    ) -> Result<BroadcastReport, MessagePushError> {
        let frame = encode_message(message)?;
        let snapshot = self.registry.snapshot_all().await;

        let mut report = BroadcastReport::default();
        for (username, handle) in snapshot {
            if exclude == Some(&username) {
                continue;
            }
            // ブロードキャストでは一部の送信失敗を許容
            match handle.push(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to push {} to '{}': {}",
                        message.kind(),
                        username,
                        e
                    );
                    handle.report_failure();
                    report.failed.push(username);
                }
            }
        }

        tracing::debug!(
            "Broadcasted {} to {} session(s), {} failed",
            message.kind(),
            report.delivered,
            report.failed.len()
        );
        Ok(report)
    }
}
