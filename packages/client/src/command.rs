//! Parsing of user input lines into chat actions.

/// Local help shown for `/help`
pub const HELP_TEXT: &str = "Available commands:\n  /quit, /exit, /q - Exit the chat\n  /ping            - Test connection to server\n  /help            - Show this help message\n";

/// What a line typed by the user asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Leave the chat
    Quit,
    /// Send a keep-alive ping
    Ping,
    /// Print [`HELP_TEXT`]
    Help,
    /// Send as a chat message
    Chat(String),
    /// Blank line, nothing to do
    Empty,
}

/// Commands are matched case-insensitively; anything else is chat text.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }

    match line.to_ascii_lowercase().as_str() {
        "/quit" | "/exit" | "/q" => Input::Quit,
        "/ping" => Input::Ping,
        "/help" => Input::Help,
        _ => Input::Chat(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quit_aliases() {
        // テスト項目: /quit, /exit, /q はすべて終了コマンドになる
        for line in ["/quit", "/exit", "/q", "/QUIT", "  /q  "] {
            assert_eq!(parse_input(line), Input::Quit, "line: {:?}", line);
        }
    }

    #[test]
    fn test_ping_and_help() {
        assert_eq!(parse_input("/ping"), Input::Ping);
        assert_eq!(parse_input("/Help"), Input::Help);
    }

    #[test]
    fn test_plain_text_is_chat() {
        // テスト項目: コマンド以外の入力は前後の空白を除いてチャットになる
        // given (前提条件):
        let line = "  hello there ";

        // when (操作):
        let result = parse_input(line);

        // then (期待する結果):
        assert_eq!(result, Input::Chat("hello there".to_string()));
    }

    #[test]
    fn test_unknown_command_is_sent_as_chat() {
        assert_eq!(parse_input("/shrug"), Input::Chat("/shrug".to_string()));
    }

    #[test]
    fn test_blank_line_is_empty() {
        assert_eq!(parse_input(""), Input::Empty);
        assert_eq!(parse_input("   \t"), Input::Empty);
    }
}
