//! Server state shared by every connection handler.

use std::sync::Arc;

use crate::{
    config::ServerConfig,
    domain::{ClientRegistry, MessagePusher},
    usecase::{ConnectParticipantUseCase, DisconnectParticipantUseCase, SendMessageUseCase},
};

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    /// ClientRegistry（参加者一覧の抽象化）
    pub registry: Arc<dyn ClientRegistry>,
    /// MessagePusher（メッセージ通知の抽象化）
    pub message_pusher: Arc<dyn MessagePusher>,
    pub connect_participant_usecase: ConnectParticipantUseCase,
    pub disconnect_participant_usecase: DisconnectParticipantUseCase,
    pub send_message_usecase: SendMessageUseCase,
}
