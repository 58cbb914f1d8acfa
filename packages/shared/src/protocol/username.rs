//! Username rule shared by the server handshake and the client pre-check.

use thiserror::Error;

/// Maximum username length, counted in Unicode scalar values
pub const MAX_USERNAME_CHARS: usize = 32;

/// Reasons a candidate username is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("username must not be empty")]
    Empty,

    #[error("username must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("username must not contain control characters")]
    ControlCharacter,
}

/// Validate a candidate username and return it with surrounding whitespace trimmed.
///
/// A valid username is 1 to [`MAX_USERNAME_CHARS`] characters with no control
/// characters; the frame boundary `\n` is a control character, so it is covered.
pub fn validate_username(raw: &str) -> Result<&str, UsernameError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UsernameError::Empty);
    }

    let actual = trimmed.chars().count();
    if actual > MAX_USERNAME_CHARS {
        return Err(UsernameError::TooLong {
            max: MAX_USERNAME_CHARS,
            actual,
        });
    }

    if trimmed.chars().any(char::is_control) {
        return Err(UsernameError::ControlCharacter);
    }

    Ok(trimmed)
}
