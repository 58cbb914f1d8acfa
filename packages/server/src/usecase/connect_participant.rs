//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() メソッド
//! - 重複チェックと登録が一つの原子的操作で行われること
//! - 参加通知が本人以外にのみ送られること

use std::sync::Arc;

use chatline_shared::{protocol::ServerMessage, time::Clock};

use crate::domain::{
    BroadcastReport, ClientRegistry, MessagePushError, MessagePusher, SessionHandle, Timestamp,
    Username,
};

use super::error::ConnectError;

/// Accepted handshake
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinAccepted {
    pub joined_at: Timestamp,
    /// Sorted roster at the moment of registration, joiner included
    pub roster: Vec<Username>,
}

impl JoinAccepted {
    /// Welcome message for the joiner
    pub fn welcome(&self) -> ServerMessage {
        ServerMessage::welcome(self.roster.iter().map(|u| u.as_str().to_string()).collect())
    }
}

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    /// ClientRegistry（参加者一覧の抽象化）
    registry: Arc<dyn ClientRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectParticipantUseCase {
    pub fn new(
        registry: Arc<dyn ClientRegistry>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            message_pusher,
            clock,
        }
    }

    /// 参加者接続を実行
    ///
    /// The duplicate check and the insert are a single registry operation, so
    /// of several concurrent joins with the same name exactly one succeeds.
    pub async fn execute(
        &self,
        username: Username,
        handle: SessionHandle,
    ) -> Result<JoinAccepted, ConnectError> {
        let joined_at = Timestamp::new(self.clock.now_epoch_secs());
        let roster = self.registry.try_insert(username, handle).await?;
        Ok(JoinAccepted { joined_at, roster })
    }

    /// 参加者が join したことを既存の参加者にブロードキャスト
    pub async fn announce_joined(
        &self,
        username: &Username,
    ) -> Result<BroadcastReport, MessagePushError> {
        self.message_pusher
            .broadcast(&ServerMessage::user_joined(username.as_str()), Some(username))
            .await
    }
}
