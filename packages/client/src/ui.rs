//! UI utilities for the client.

use std::io::Write;

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(username: &str) {
    print!("{}> ", username);
    std::io::stdout().flush().ok();
}

/// Print output from the network side without garbling the input prompt
pub fn print_above_prompt(text: &str, username: &str) {
    print!("\r{}", text);
    redisplay_prompt(username);
}
