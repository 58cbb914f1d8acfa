//! TCP client session management.

use std::time::Duration;

use chatline_shared::protocol::{ClientCodec, ClientMessage, Decoded, ServerMessage};
use futures_util::{SinkExt, StreamExt};
use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::{
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::{
    command::{HELP_TEXT, Input, parse_input},
    error::ClientError,
    formatter::MessageFormatter,
    ui::{print_above_prompt, redisplay_prompt},
};

const HANDSHAKE_TIMEOUT_SECS: u64 = 10;
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(60);

/// A joined connection, ready for [`ChatSession::run`]
pub struct ChatSession {
    username: String,
    frames: FramedRead<OwnedReadHalf, ClientCodec>,
    sink: FramedWrite<OwnedWriteHalf, ClientCodec>,
    /// Roster from the welcome, joiner included
    users: Vec<String>,
    greeting: String,
}

impl ChatSession {
    /// Connect to `host:port` and join as `username`.
    ///
    /// Waits up to 10 seconds for the welcome. An error reply from the server
    /// becomes [`ClientError::Rejected`].
    pub async fn connect(host: &str, port: u16, username: &str) -> Result<Self, ClientError> {
        let stream = TcpStream::connect((host, port))
            .await
            .map_err(ClientError::ConnectionError)?;
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("Failed to set TCP_NODELAY: {}", e);
        }

        let (read_half, write_half) = stream.into_split();
        let mut frames = FramedRead::new(read_half, ClientCodec::new());
        let mut sink = FramedWrite::new(write_half, ClientCodec::new());

        sink.send(ClientMessage::Join {
            username: username.to_string(),
        })
        .await?;

        let reply = tokio::time::timeout(
            Duration::from_secs(HANDSHAKE_TIMEOUT_SECS),
            frames.next(),
        )
        .await
        .map_err(|_| ClientError::HandshakeTimeout(HANDSHAKE_TIMEOUT_SECS))?;

        match reply {
            Some(Ok(Decoded::Message(ServerMessage::Welcome { message, users }))) => Ok(Self {
                username: username.to_string(),
                frames,
                sink,
                users,
                greeting: message,
            }),
            Some(Ok(Decoded::Message(ServerMessage::Error { message }))) => {
                Err(ClientError::Rejected(message))
            }
            Some(Ok(Decoded::Message(other))) => {
                Err(ClientError::UnexpectedResponse(other.kind().to_string()))
            }
            Some(Ok(Decoded::Malformed(frame))) => {
                Err(ClientError::UnexpectedResponse(frame.to_string()))
            }
            Some(Err(e)) => Err(e.into()),
            None => Err(ClientError::ConnectionLost),
        }
    }

    pub fn users(&self) -> &[String] {
        &self.users
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    /// Relay user input to the server and server messages to the terminal.
    ///
    /// Returns `Ok(())` when the user leaves (`/quit`, Ctrl+C, Ctrl+D) and an
    /// error when the connection is lost.
    pub async fn run(
        mut self,
        input: &mut mpsc::UnboundedReceiver<String>,
    ) -> Result<(), ClientError> {
        let formatter = MessageFormatter::local();

        print!(
            "{}",
            formatter.format_welcome(&self.greeting, &self.users, &self.username)
        );
        print!("{}", formatter.format_banner());
        redisplay_prompt(&self.username);

        let mut keepalive =
            tokio::time::interval_at(Instant::now() + KEEPALIVE_INTERVAL, KEEPALIVE_INTERVAL);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                frame = self.frames.next() => match frame {
                    Some(Ok(Decoded::Message(message))) => {
                        if let Some(text) = formatter.format(&message, &self.username) {
                            print_above_prompt(&text, &self.username);
                        }
                    }
                    Some(Ok(Decoded::Malformed(frame))) => {
                        tracing::warn!("Ignoring malformed frame from server: {}", frame);
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => {
                        tracing::info!("Server closed the connection");
                        return Err(ClientError::ConnectionLost);
                    }
                },
                line = input.recv() => {
                    let Some(line) = line else {
                        self.leave().await;
                        return Ok(());
                    };
                    match parse_input(&line) {
                        Input::Quit => {
                            self.leave().await;
                            return Ok(());
                        }
                        Input::Ping => self.sink.send(ClientMessage::Ping).await?,
                        Input::Help => print_above_prompt(HELP_TEXT, &self.username),
                        Input::Chat(message) => {
                            self.sink.send(ClientMessage::Chat { message }).await?
                        }
                        Input::Empty => {}
                    }
                },
                _ = keepalive.tick() => {
                    tracing::debug!("Sending keepalive ping");
                    self.sink.send(ClientMessage::Ping).await?;
                }
            }
        }
    }

    async fn leave(&mut self) {
        println!("\n👋 Disconnecting from chat...");
        if let Err(e) = self.sink.close().await {
            tracing::debug!("Failed to close connection cleanly: {}", e);
        }
    }
}

/// Read lines with rustyline on a dedicated thread.
///
/// The thread stops on Ctrl+C, Ctrl+D or after forwarding a quit command;
/// the receiver then yields `None` once drained.
pub fn spawn_input_thread(username: &str) -> mpsc::UnboundedReceiver<String> {
    let (input_tx, input_rx) = mpsc::unbounded_channel::<String>();
    let prompt = format!("{}> ", username);

    std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("Failed to initialize readline: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line.as_str()).ok();
                    let quit = parse_input(&line) == Input::Quit;
                    if input_tx.send(line).is_err() || quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    input_rx
}
