//! UseCase: メッセージ送信処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - SendMessageUseCase::execute() メソッド
//! - 送信者を含む全員へ、サーバー時刻付きでブロードキャストされること
//! - 同じ送信者のメッセージが処理順に届くこと

use std::sync::Arc;

use chatline_shared::{protocol::ServerMessage, time::Clock};

use crate::domain::{BroadcastReport, MessageContent, MessagePusher, Username};

use super::error::SendMessageError;

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl SendMessageUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            message_pusher,
            clock,
        }
    }

    /// メッセージ送信を実行
    ///
    /// The chat is echoed to every joined session, sender included, stamped
    /// with the server clock.
    pub async fn execute(
        &self,
        from: &Username,
        content: MessageContent,
    ) -> Result<BroadcastReport, SendMessageError> {
        let message = ServerMessage::chat(
            from.as_str(),
            content.into_string(),
            self.clock.now_epoch_secs(),
        );

        self.message_pusher
            .broadcast(&message, None)
            .await
            .map_err(|e| SendMessageError::BroadcastFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chatline_shared::time::FixedClock;

    use super::*;
    use crate::domain::{MessagePushError, SessionHandle};

    // Mock MessagePusher for testing
    #[derive(Default)]
    struct RecordingMessagePusher {
        broadcasts: Mutex<Vec<(ServerMessage, Option<Username>)>>,
    }

    #[async_trait]
    impl MessagePusher for RecordingMessagePusher {
        async fn push_to(
            &self,
            _target: &SessionHandle,
            _message: &ServerMessage,
        ) -> Result<(), MessagePushError> {
            Ok(())
        }

        async fn broadcast(
            &self,
            message: &ServerMessage,
            exclude: Option<&Username>,
        ) -> Result<BroadcastReport, MessagePushError> {
            self.broadcasts
                .lock()
                .unwrap()
                .push((message.clone(), exclude.cloned()));
            Ok(BroadcastReport {
                delivered: 1,
                failed: vec![],
            })
        }
    }

    struct FailingMessagePusher;

    #[async_trait]
    impl MessagePusher for FailingMessagePusher {
        async fn push_to(
            &self,
            _target: &SessionHandle,
            _message: &ServerMessage,
        ) -> Result<(), MessagePushError> {
            Err(MessagePushError::PushFailed("nobody".to_string()))
        }

        async fn broadcast(
            &self,
            _message: &ServerMessage,
            _exclude: Option<&Username>,
        ) -> Result<BroadcastReport, MessagePushError> {
            Err(MessagePushError::PushFailed("everyone".to_string()))
        }
    }

    fn username(name: &str) -> Username {
        Username::new(name.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_send_message_broadcasts_to_everyone_with_server_time() {
        // テスト項目: チャットは除外なしでサーバー時刻付きでブロードキャストされる
        // given (前提条件):
        let pusher = Arc::new(RecordingMessagePusher::default());
        let usecase = SendMessageUseCase::new(pusher.clone(), Arc::new(FixedClock::new(42)));

        // when (操作):
        let result = usecase
            .execute(&username("alice"), MessageContent::new("hi".to_string()).unwrap())
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        let broadcasts = pusher.broadcasts.lock().unwrap();
        assert_eq!(
            *broadcasts,
            vec![(ServerMessage::chat("alice", "hi", 42), None)]
        );
    }

    #[tokio::test]
    async fn test_send_message_preserves_sender_order() {
        // テスト項目: 同じ送信者のメッセージは処理順にブロードキャストされる
        // given (前提条件):
        let pusher = Arc::new(RecordingMessagePusher::default());
        let usecase = SendMessageUseCase::new(pusher.clone(), Arc::new(FixedClock::new(7)));
        let alice = username("alice");

        // when (操作):
        for text in ["one", "two", "three"] {
            usecase
                .execute(&alice, MessageContent::new(text.to_string()).unwrap())
                .await
                .unwrap();
        }

        // then (期待する結果):
        let texts: Vec<String> = pusher
            .broadcasts
            .lock()
            .unwrap()
            .iter()
            .map(|(m, _)| match m {
                ServerMessage::ChatBroadcast { message, .. } => message.clone(),
                other => panic!("unexpected message {:?}", other),
            })
            .collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_send_message_broadcast_failure() {
        // テスト項目: ブロードキャスト失敗は BroadcastFailed として返される
        let usecase =
            SendMessageUseCase::new(Arc::new(FailingMessagePusher), Arc::new(FixedClock::new(0)));

        let result = usecase
            .execute(&username("alice"), MessageContent::new("hi".to_string()).unwrap())
            .await;

        assert!(matches!(result, Err(SendMessageError::BroadcastFailed(_))));
    }
}
