//! UseCase: 参加者切断処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::execute() メソッド
//! - 退出通知が残りの参加者にちょうど 1 回だけ送られること
//!
//! ### どのような状況を想定しているか
//! - 正常系：参加者の切断と通知
//! - エッジケース：最後の参加者の切断（通知対象なし）
//! - 冪等性：既に削除済みの参加者の切断（通知しない）

use std::sync::Arc;

use chatline_shared::protocol::ServerMessage;

use crate::domain::{BroadcastReport, ClientRegistry, MessagePushError, MessagePusher, Username};

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// ClientRegistry（参加者一覧の抽象化）
    registry: Arc<dyn ClientRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectParticipantUseCase {
    pub fn new(registry: Arc<dyn ClientRegistry>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            registry,
            message_pusher,
        }
    }

    /// 参加者切断を実行
    ///
    /// Removes `username` and, only if an entry was actually removed,
    /// announces the departure to everyone left.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(report))` - 削除して退出通知を送信した
    /// * `Ok(None)` - 既に削除済みだったため何もしなかった
    pub async fn execute(
        &self,
        username: &Username,
    ) -> Result<Option<BroadcastReport>, MessagePushError> {
        if !self.registry.remove(username).await {
            tracing::debug!("'{}' was already removed from the registry", username);
            return Ok(None);
        }

        let report = self
            .message_pusher
            .broadcast(&ServerMessage::user_left(username.as_str()), None)
            .await?;
        Ok(Some(report))
    }

    /// 残りの参加者がいるかどうか
    pub async fn has_remaining_participants(&self) -> bool {
        self.registry.contains_any().await
    }
}
