//! Message shapes exchanged between client and server.

use serde::{Deserialize, Serialize};

/// Greeting text carried by every welcome message
pub const WELCOME_MESSAGE: &str = "Welcome!";

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Handshake request carrying the candidate username
    Join { username: String },
    /// Chat text to be broadcast to the room
    Chat { message: String },
    /// Keep-alive ping, answered with [`ServerMessage::Pong`]
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Handshake accepted; `users` is the sorted roster including the joiner
    Welcome { message: String, users: Vec<String> },
    /// Chat relayed by the server, stamped with server time (epoch seconds)
    #[serde(rename = "chat")]
    ChatBroadcast {
        username: String,
        message: String,
        timestamp: i64,
    },
    UserJoined { username: String, message: String },
    UserLeft { username: String, message: String },
    Error { message: String },
    Pong,
}

impl ServerMessage {
    pub fn welcome(users: Vec<String>) -> Self {
        Self::Welcome {
            message: WELCOME_MESSAGE.to_string(),
            users,
        }
    }

    pub fn chat(username: impl Into<String>, message: impl Into<String>, timestamp: i64) -> Self {
        Self::ChatBroadcast {
            username: username.into(),
            message: message.into(),
            timestamp,
        }
    }

    pub fn user_joined(username: impl Into<String>) -> Self {
        let username = username.into();
        let message = format!("{} joined the chat", username);
        Self::UserJoined { username, message }
    }

    pub fn user_left(username: impl Into<String>) -> Self {
        let username = username.into();
        let message = format!("{} left the chat", username);
        Self::UserLeft { username, message }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Wire tag of this message, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Welcome { .. } => "welcome",
            Self::ChatBroadcast { .. } => "chat",
            Self::UserJoined { .. } => "user_joined",
            Self::UserLeft { .. } => "user_left",
            Self::Error { .. } => "error",
            Self::Pong => "pong",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_welcome_serializes_to_wire_shape() {
        // テスト項目: welcome メッセージがプロトコル通りの JSON になる
        // given (前提条件):
        let msg = ServerMessage::welcome(vec!["alice".to_string()]);

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            r#"{"type":"welcome","message":"Welcome!","users":["alice"]}"#
        );
    }

    #[test]
    fn test_chat_broadcast_uses_chat_tag() {
        // テスト項目: ChatBroadcast は "chat" タグでシリアライズされる
        // given (前提条件):
        let msg = ServerMessage::chat("alice", "hi", 1_700_000_000);

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            r#"{"type":"chat","username":"alice","message":"hi","timestamp":1700000000}"#
        );
    }

    #[test]
    fn test_user_left_message_text() {
        // テスト項目: user_left の本文が "<name> left the chat" になる
        // given (前提条件):
        let msg = ServerMessage::user_left("bob");

        // when (操作):
        let json = serde_json::to_string(&msg).unwrap();

        // then (期待する結果):
        assert_eq!(
            json,
            r#"{"type":"user_left","username":"bob","message":"bob left the chat"}"#
        );
    }

    #[test]
    fn test_error_and_pong_shapes() {
        // テスト項目: error と pong の JSON 形状
        // given (前提条件):
        let error = ServerMessage::error("Username already taken");
        let pong = ServerMessage::Pong;

        // when (操作):
        let error_json = serde_json::to_string(&error).unwrap();
        let pong_json = serde_json::to_string(&pong).unwrap();

        // then (期待する結果):
        assert_eq!(
            error_json,
            r#"{"type":"error","message":"Username already taken"}"#
        );
        assert_eq!(pong_json, r#"{"type":"pong"}"#);
    }

    #[test]
    fn test_client_messages_parse_from_wire() {
        // テスト項目: クライアントからの JSON が ClientMessage にパースされる
        // given (前提条件):
        let join = r#"{"type":"join","username":"alice"}"#;
        let chat = r#"{"type":"chat","message":"hi"}"#;
        let ping = r#"{"type":"ping"}"#;

        // when (操作):
        let join: ClientMessage = serde_json::from_str(join).unwrap();
        let chat: ClientMessage = serde_json::from_str(chat).unwrap();
        let ping: ClientMessage = serde_json::from_str(ping).unwrap();

        // then (期待する結果):
        assert_eq!(
            join,
            ClientMessage::Join {
                username: "alice".to_string()
            }
        );
        assert_eq!(
            chat,
            ClientMessage::Chat {
                message: "hi".to_string()
            }
        );
        assert_eq!(ping, ClientMessage::Ping);
    }

    #[test]
    fn test_client_message_with_missing_field_is_rejected() {
        // テスト項目: 必須フィールドが欠けた join はパースに失敗する
        // given (前提条件):
        let raw = r#"{"type":"join"}"#;

        // when (操作):
        let result = serde_json::from_str::<ClientMessage>(raw);

        // then (期待する結果):
        assert!(result.is_err());
    }

    #[test]
    fn test_server_message_kind() {
        // テスト項目: kind() がワイヤ上のタグを返す
        assert_eq!(ServerMessage::chat("a", "b", 0).kind(), "chat");
        assert_eq!(ServerMessage::user_joined("a").kind(), "user_joined");
        assert_eq!(ServerMessage::Pong.kind(), "pong");
    }
}
