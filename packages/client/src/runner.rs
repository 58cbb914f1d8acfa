//! Client execution logic with reconnection support.

use std::time::Duration;

use chatline_shared::protocol::validate_username;
use tokio::sync::mpsc;

use super::{
    domain::{should_attempt_reconnect, should_exit_immediately},
    error::ClientError,
    session::{ChatSession, spawn_input_thread},
};

const MAX_RECONNECT_ATTEMPTS: u32 = 5;
const RECONNECT_INTERVAL_SECS: u64 = 5;

/// Run the chat client with reconnection logic
///
/// Returns `Ok(())` when the user leaves. A rejected join, an invalid
/// username or running out of reconnect attempts is returned as an error.
pub async fn run_client(host: String, port: u16, username: String) -> Result<(), ClientError> {
    let username = validate_username(&username)?.to_string();

    let mut input: Option<mpsc::UnboundedReceiver<String>> = None;
    let mut reconnect_count = 0;

    loop {
        tracing::info!(
            "Attempting to connect to {}:{} as '{}' (attempt {}/{})",
            host,
            port,
            username,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        let result = match ChatSession::connect(&host, port, &username).await {
            Ok(session) => {
                tracing::info!("Connected to chat server!");
                reconnect_count = 0;
                // spawned once and shared by every session so that a
                // reconnect does not start a second readline
                let input = input.get_or_insert_with(|| spawn_input_thread(&username));
                session.run(input).await
            }
            Err(e) => Err(e),
        };

        let e = match result {
            Ok(()) => {
                tracing::info!("Client session ended normally");
                println!("✅ Disconnected successfully");
                return Ok(());
            }
            Err(e) => e,
        };

        if should_exit_immediately(&e) {
            tracing::error!("{}", e);
            return Err(e);
        }

        tracing::warn!("Connection lost: {}", e);
        reconnect_count += 1;

        if !should_attempt_reconnect(&e, reconnect_count, MAX_RECONNECT_ATTEMPTS) {
            tracing::error!(
                "Failed to reconnect after {} attempts. Exiting.",
                MAX_RECONNECT_ATTEMPTS
            );
            return Err(e);
        }

        tracing::info!(
            "Reconnecting in {} seconds... (attempt {}/{})",
            RECONNECT_INTERVAL_SECS,
            reconnect_count + 1,
            MAX_RECONNECT_ATTEMPTS
        );

        tokio::time::sleep(Duration::from_secs(RECONNECT_INTERVAL_SECS)).await;
    }
}
