//! Message formatting utilities for client display.

use std::fmt::Display;

use chatline_shared::{protocol::ServerMessage, time::format_clock_time_in};
use chrono::{Local, TimeZone};

const RULE: &str = "==================================================";

/// Message formatter for client display
///
/// Chat timestamps are rendered as `HH:MM:SS` in `zone` (local time by default).
#[derive(Debug, Clone)]
pub struct MessageFormatter<Tz: TimeZone = Local> {
    zone: Tz,
}

impl MessageFormatter<Local> {
    pub fn local() -> Self {
        Self { zone: Local }
    }
}

impl<Tz: TimeZone> MessageFormatter<Tz>
where
    Tz::Offset: Display,
{
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Render a server message for `current_username`.
    ///
    /// Returns `None` for messages that are not shown (pong).
    pub fn format(&self, message: &ServerMessage, current_username: &str) -> Option<String> {
        let text = match message {
            ServerMessage::Welcome { message, users } => {
                self.format_welcome(message, users, current_username)
            }
            ServerMessage::ChatBroadcast {
                username,
                message,
                timestamp,
            } => self.format_chat_message(username, message, *timestamp),
            ServerMessage::UserJoined { username, .. } => self.format_user_joined(username),
            ServerMessage::UserLeft { username, .. } => self.format_user_left(username),
            ServerMessage::Error { message } => self.format_error(message),
            ServerMessage::Pong => return None,
        };
        Some(text)
    }

    /// Greeting plus the other users already online
    pub fn format_welcome(&self, message: &str, users: &[String], current_username: &str) -> String {
        let mut output = format!("✅ {}\n", message);
        let others: Vec<&str> = users
            .iter()
            .map(String::as_str)
            .filter(|user| *user != current_username)
            .collect();
        if !others.is_empty() {
            output.push_str(&format!("👥 Users online: {}\n", others.join(", ")));
        }
        output
    }

    /// `[HH:MM:SS] name: text`
    pub fn format_chat_message(&self, from: &str, content: &str, sent_at: i64) -> String {
        let time_str = format_clock_time_in(sent_at, &self.zone);
        format!("[{}] {}: {}\n", time_str, from, content)
    }

    pub fn format_user_joined(&self, username: &str) -> String {
        format!("🟢 {} joined the chat\n", username)
    }

    pub fn format_user_left(&self, username: &str) -> String {
        format!("🔴 {} left the chat\n", username)
    }

    pub fn format_error(&self, message: &str) -> String {
        format!("❌ Server error: {}\n", message)
    }

    /// Banner printed once the chat starts
    pub fn format_banner(&self) -> String {
        format!(
            "\n{}\n💬 Chat started! Type your messages and press Enter.\n💡 Commands: /quit to exit, /ping to test connection, /help for help\n{}\n",
            RULE, RULE
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn formatter() -> MessageFormatter<Utc> {
        MessageFormatter::new(Utc)
    }

    #[test]
    fn test_format_chat_message() {
        // テスト項目: チャットメッセージが [HH:MM:SS] name: text 形式になる
        // given (前提条件):
        let message = ServerMessage::chat("alice", "Hello, world!", 1_672_498_800);

        // when (操作):
        let result = formatter().format(&message, "bob");

        // then (期待する結果):
        assert_eq!(result.as_deref(), Some("[15:00:00] alice: Hello, world!\n"));
    }

    #[test]
    fn test_format_welcome_lists_other_users() {
        // テスト項目: welcome では自分以外のオンラインユーザーが表示される
        // given (前提条件):
        let message = ServerMessage::welcome(vec![
            "alice".to_string(),
            "bob".to_string(),
            "carol".to_string(),
        ]);

        // when (操作):
        let result = formatter().format(&message, "bob").unwrap();

        // then (期待する結果):
        assert!(result.contains("Welcome!"));
        assert!(result.contains("Users online: alice, carol"));
    }

    #[test]
    fn test_format_welcome_alone_has_no_user_list() {
        // テスト項目: 自分しかいない場合はユーザー一覧を表示しない
        let message = ServerMessage::welcome(vec!["alice".to_string()]);

        let result = formatter().format(&message, "alice").unwrap();

        assert!(!result.contains("Users online"));
    }

    #[test]
    fn test_format_membership_notices() {
        // テスト項目: 参加・退出通知が正しくフォーマットされる
        let f = formatter();

        assert_eq!(
            f.format(&ServerMessage::user_joined("bob"), "alice").unwrap(),
            "🟢 bob joined the chat\n"
        );
        assert_eq!(
            f.format(&ServerMessage::user_left("bob"), "alice").unwrap(),
            "🔴 bob left the chat\n"
        );
    }

    #[test]
    fn test_format_error() {
        let result = formatter()
            .format(&ServerMessage::error("Malformed message"), "alice")
            .unwrap();

        assert_eq!(result, "❌ Server error: Malformed message\n");
    }

    #[test]
    fn test_pong_is_not_displayed() {
        // テスト項目: pong は表示しない
        assert_eq!(formatter().format(&ServerMessage::Pong, "alice"), None);
    }

    #[test]
    fn test_banner_mentions_commands() {
        let banner = formatter().format_banner();

        assert!(banner.contains("/quit"));
        assert!(banner.contains("/ping"));
    }
}
