//! Value objects for the chat domain.

use std::fmt;

use chatline_shared::protocol::validate_username;
use uuid::Uuid;

use super::error::ValueObjectError;

/// Display name of a joined participant.
///
/// Always trimmed, 1 to 32 characters, free of control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Username(String);

impl Username {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = validate_username(&value)?;
        if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chat text after trimming; never blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent(String);

impl MessageContent {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyMessageContent);
        }
        if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Unix timestamp in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Identifier of one accepted connection, used in logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // first block is enough to tell sessions apart in logs
        let simple = self.0.simple().to_string();
        f.write_str(&simple[..8])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatline_shared::protocol::UsernameError;

    #[test]
    fn test_username_new_trims() {
        // テスト項目: Username は前後の空白を取り除いて保持する
        // given (前提条件):
        let raw = "  alice ".to_string();

        // when (操作):
        let username = Username::new(raw).unwrap();

        // then (期待する結果):
        assert_eq!(username.as_str(), "alice");
    }

    #[test]
    fn test_username_new_rejects_invalid() {
        // テスト項目: 不正な Username は ValueObjectError になる
        assert_eq!(
            Username::new(String::new()),
            Err(ValueObjectError::InvalidUsername(UsernameError::Empty))
        );
        assert!(Username::new("a\nb".to_string()).is_err());
    }

    #[test]
    fn test_username_ordering_is_lexicographic() {
        // テスト項目: Username の順序は文字列順になる
        let mut names = vec![
            Username::new("charlie".to_string()).unwrap(),
            Username::new("alice".to_string()).unwrap(),
            Username::new("bob".to_string()).unwrap(),
        ];
        names.sort();
        let names: Vec<&str> = names.iter().map(Username::as_str).collect();
        assert_eq!(names, vec!["alice", "bob", "charlie"]);
    }

    #[test]
    fn test_message_content_rejects_blank() {
        // テスト項目: 空白のみのメッセージは拒否される
        assert_eq!(
            MessageContent::new("   ".to_string()),
            Err(ValueObjectError::EmptyMessageContent)
        );
    }

    #[test]
    fn test_message_content_trims() {
        assert_eq!(
            MessageContent::new(" hi \n".to_string()).unwrap().as_str(),
            "hi"
        );
    }

    #[test]
    fn test_session_id_display_is_short() {
        // テスト項目: SessionId の表示は 8 文字の短縮形になる
        let id = SessionId::generate();
        assert_eq!(id.to_string().len(), 8);
        assert_ne!(SessionId::generate(), id);
    }
}
