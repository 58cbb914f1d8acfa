//! TCP connection handler.
//!
//! One handler per accepted socket. It walks the session through
//! Connecting -> Joined -> Closing -> Closed:
//!
//! - Connecting: exactly one frame is read. Anything but a valid, free
//!   `join` is answered with an error frame and the connection is closed.
//! - Joined: frames are read until EOF, a transport error, the idle
//!   timeout, a delivery failure or server shutdown.
//! - Closing: the participant is removed and, if it was registered,
//!   `user_left` is announced exactly once.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use bytes::Bytes;
use chatline_shared::protocol::{
    ClientMessage, CodecError, Decoded, ServerCodec, ServerMessage, encode,
};
use futures_util::StreamExt;
use thiserror::Error;
use tokio::{
    io::AsyncWriteExt,
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
};
use tokio_util::{codec::FramedRead, sync::CancellationToken};

use crate::{
    domain::{ClientSession, MessageContent, SessionError, SessionHandle, SessionId, Username},
    ui::state::AppState,
    usecase::{ConnectError, JoinAccepted},
};

use super::writer::WriterTask;

const INVALID_USERNAME: &str = "Invalid username";
const USERNAME_TAKEN: &str = "Username already taken";
const EXPECTED_JOIN: &str = "Expected a join message";
const MALFORMED_MESSAGE: &str = "Malformed message";
const ALREADY_JOINED: &str = "Already joined";

/// How long a rejected connection keeps reading before the socket is dropped
const REJECT_LINGER: Duration = Duration::from_millis(500);

/// Why a session ended
#[derive(Debug, Error)]
enum CloseReason {
    #[error("peer closed the connection")]
    PeerClosed,
    #[error("transport error: {0}")]
    Transport(#[from] CodecError),
    #[error("no join within the handshake timeout")]
    HandshakeTimeout,
    #[error("idle timeout")]
    IdleTimeout,
    #[error("handshake rejected: {0}")]
    Rejected(&'static str),
    #[error("outbound delivery failed")]
    DeliveryFailed,
    #[error("server shutting down")]
    Shutdown,
    #[error(transparent)]
    Session(#[from] SessionError),
}

enum Inbound {
    Frame(Decoded<ClientMessage>),
    Closed,
    Failed(CodecError),
    TimedOut,
}

pub struct ConnectionHandler {
    state: Arc<AppState>,
    session: ClientSession,
    frames: FramedRead<OwnedReadHalf, ServerCodec>,
    /// Cancelled on server shutdown or when delivery to this session fails
    session_token: CancellationToken,
    shutdown: CancellationToken,
}

impl ConnectionHandler {
    /// Split `socket` and prepare a session in the Connecting state.
    ///
    /// Returns the handler, the write half and the receiving end of the
    /// session's outbound queue; all three are handed to [`Self::run`].
    pub fn new(
        socket: TcpStream,
        peer_addr: SocketAddr,
        state: Arc<AppState>,
        shutdown: CancellationToken,
    ) -> (Self, OwnedWriteHalf, mpsc::Receiver<Bytes>) {
        let (read_half, write_half) = socket.into_split();
        let frames = FramedRead::new(
            read_half,
            ServerCodec::with_max_frame_length(state.config.max_frame_length),
        );

        let session_token = shutdown.child_token();
        let (handle, outbound) = SessionHandle::channel(
            SessionId::generate(),
            state.config.outbound_queue_capacity,
            session_token.clone(),
        );
        let session = ClientSession::new(peer_addr, handle);
        tracing::debug!("Session {} created for {}", session.id(), peer_addr);

        let handler = Self {
            state,
            session,
            frames,
            session_token,
            shutdown,
        };
        (handler, write_half, outbound)
    }

    pub async fn run(mut self, mut writer: OwnedWriteHalf, outbound: mpsc::Receiver<Bytes>) {
        let (username, accepted) = match self.handshake(&mut writer).await {
            Ok(joined) => joined,
            Err(reason) => {
                if let Err(e) = writer.shutdown().await {
                    tracing::debug!("Session {} shutdown failed: {}", self.session.id(), e);
                }
                if matches!(reason, CloseReason::Rejected(_)) {
                    self.discard_unread().await;
                }
                self.close(reason, None).await;
                return;
            }
        };

        // Welcome goes straight to the socket; anything broadcast to this
        // session since registration waits in the queue behind it.
        if let Err(e) = write_message(&mut writer, &accepted.welcome()).await {
            self.close(CloseReason::Transport(e), None).await;
            return;
        }

        tracing::info!(
            "'{}' joined from {} ({} online)",
            username,
            self.session.peer_addr(),
            accepted.roster.len()
        );

        let writer = WriterTask::spawn(
            self.session.id(),
            writer,
            outbound,
            self.session_token.clone(),
        );

        if let Err(e) = self
            .state
            .connect_participant_usecase
            .announce_joined(&username)
            .await
        {
            tracing::warn!("Failed to announce '{}': {}", username, e);
        }

        let reason = self.serve_joined(&username).await;
        self.close(reason, Some(writer)).await;
    }

    /// Connecting: read the one and only handshake frame
    async fn handshake(
        &mut self,
        writer: &mut OwnedWriteHalf,
    ) -> Result<(Username, JoinAccepted), CloseReason> {
        let shutdown = self.shutdown.clone();
        let handshake_timeout = self.state.config.handshake_timeout;

        let inbound = tokio::select! {
            _ = shutdown.cancelled() => return Err(CloseReason::Shutdown),
            inbound = self.next_inbound(Some(handshake_timeout)) => inbound,
        };

        let raw_username = match inbound {
            Inbound::Frame(Decoded::Message(ClientMessage::Join { username })) => username,
            Inbound::Frame(Decoded::Message(other)) => {
                tracing::warn!(
                    "Session {} sent {:?} before joining",
                    self.session.id(),
                    other
                );
                return Err(reject(writer, EXPECTED_JOIN).await);
            }
            Inbound::Frame(Decoded::Malformed(frame)) => {
                tracing::warn!(
                    "Session {} sent a malformed handshake: {}",
                    self.session.id(),
                    frame
                );
                return Err(reject(writer, EXPECTED_JOIN).await);
            }
            Inbound::Closed => return Err(CloseReason::PeerClosed),
            Inbound::Failed(e) => return Err(CloseReason::Transport(e)),
            Inbound::TimedOut => return Err(CloseReason::HandshakeTimeout),
        };

        let username = match Username::new(raw_username) {
            Ok(username) => username,
            Err(e) => {
                tracing::warn!("Session {} rejected: {}", self.session.id(), e);
                return Err(reject(writer, INVALID_USERNAME).await);
            }
        };

        let accepted = match self
            .state
            .connect_participant_usecase
            .execute(username.clone(), self.session.handle().clone())
            .await
        {
            Ok(accepted) => accepted,
            Err(ConnectError::UsernameTaken(name)) => {
                tracing::warn!(
                    "Session {} rejected: username '{}' is already taken",
                    self.session.id(),
                    name
                );
                return Err(reject(writer, USERNAME_TAKEN).await);
            }
        };

        if let Err(e) = self
            .session
            .mark_joined(username.clone(), accepted.joined_at)
        {
            // never reachable from Connecting; undo the registration anyway
            self.state.registry.remove(&username).await;
            return Err(e.into());
        }

        Ok((username, accepted))
    }

    /// Joined: relay chat until the session ends
    async fn serve_joined(&mut self, username: &Username) -> CloseReason {
        let session_token = self.session_token.clone();
        let shutdown = self.shutdown.clone();
        let idle_timeout = self.state.config.idle_timeout;

        loop {
            let inbound = tokio::select! {
                _ = session_token.cancelled() => {
                    return if shutdown.is_cancelled() {
                        CloseReason::Shutdown
                    } else {
                        CloseReason::DeliveryFailed
                    };
                }
                inbound = self.next_inbound(idle_timeout) => inbound,
            };

            match inbound {
                Inbound::Frame(Decoded::Message(message)) => {
                    self.handle_message(username, message).await;
                }
                Inbound::Frame(Decoded::Malformed(frame)) => {
                    tracing::warn!("Malformed frame from '{}': {}", username, frame);
                    self.reply(ServerMessage::error(MALFORMED_MESSAGE)).await;
                }
                Inbound::Closed => return CloseReason::PeerClosed,
                Inbound::Failed(e) => return CloseReason::Transport(e),
                Inbound::TimedOut => return CloseReason::IdleTimeout,
            }
        }
    }

    async fn handle_message(&self, username: &Username, message: ClientMessage) {
        match message {
            ClientMessage::Chat { message } => {
                let content = match MessageContent::new(message) {
                    Ok(content) => content,
                    Err(_) => {
                        tracing::debug!("Ignoring blank chat from '{}'", username);
                        return;
                    }
                };
                tracing::debug!("{}: {}", username, content.as_str());
                if let Err(e) = self
                    .state
                    .send_message_usecase
                    .execute(username, content)
                    .await
                {
                    tracing::error!("Failed to relay chat from '{}': {}", username, e);
                }
            }
            ClientMessage::Ping => {
                self.reply(ServerMessage::Pong).await;
            }
            ClientMessage::Join { .. } => {
                tracing::warn!("'{}' sent a second join", username);
                self.reply(ServerMessage::error(ALREADY_JOINED)).await;
            }
        }
    }

    /// Queue a message for this session only
    async fn reply(&self, message: ServerMessage) {
        if let Err(e) = self
            .state
            .message_pusher
            .push_to(self.session.handle(), &message)
            .await
        {
            // the pusher has already flagged the session as failed
            tracing::debug!("Session {} reply failed: {}", self.session.id(), e);
        }
    }

    async fn next_inbound(&mut self, deadline: Option<Duration>) -> Inbound {
        let next = match deadline {
            Some(deadline) => match tokio::time::timeout(deadline, self.frames.next()).await {
                Ok(next) => next,
                Err(_) => return Inbound::TimedOut,
            },
            None => self.frames.next().await,
        };

        match next {
            Some(Ok(frame)) => Inbound::Frame(frame),
            Some(Err(e)) => Inbound::Failed(e),
            None => Inbound::Closed,
        }
    }

    /// Read and drop whatever the peer already sent, until EOF or
    /// [`REJECT_LINGER`].
    ///
    /// Dropping a socket with unread input resets the connection, and the
    /// reset can overtake the error frame still in flight to the peer.
    async fn discard_unread(&mut self) {
        let drained = tokio::time::timeout(REJECT_LINGER, async {
            let mut discarded = 0usize;
            while let Some(Ok(_)) = self.frames.next().await {
                discarded += 1;
            }
            discarded
        })
        .await;

        match drained {
            Ok(discarded) => tracing::debug!(
                "Session {} discarded {} frame(s) after rejection",
                self.session.id(),
                discarded
            ),
            Err(_) => tracing::debug!(
                "Session {} peer kept the connection open after rejection",
                self.session.id()
            ),
        }
    }

    /// Closing -> Closed
    async fn close(mut self, reason: CloseReason, writer: Option<WriterTask>) {
        let id = self.session.id();
        tracing::info!("Session {} closing: {}", id, reason);

        match self.session.begin_closing() {
            Ok(Some(username)) => {
                match self
                    .state
                    .disconnect_participant_usecase
                    .execute(&username)
                    .await
                {
                    Ok(Some(report)) => tracing::info!(
                        "'{}' left the chat ({} participant(s) notified)",
                        username,
                        report.delivered
                    ),
                    Ok(None) => {}
                    Err(e) => tracing::warn!("Failed to announce departure of '{}': {}", username, e),
                }
            }
            Ok(None) => {}
            Err(e) => tracing::error!("Session {}: {}", id, e),
        }

        if let Some(writer) = writer {
            writer.finish().await;
        }

        if let Err(e) = self.session.close() {
            tracing::error!("Session {}: {}", id, e);
        }
        tracing::debug!("Session {} closed", id);
    }
}

/// Send an error frame during the handshake; the connection is closed after
async fn reject(writer: &mut OwnedWriteHalf, text: &'static str) -> CloseReason {
    if let Err(e) = write_message(writer, &ServerMessage::error(text)).await {
        tracing::debug!("Failed to deliver rejection '{}': {}", text, e);
    }
    CloseReason::Rejected(text)
}

async fn write_message(
    writer: &mut OwnedWriteHalf,
    message: &ServerMessage,
) -> Result<(), CodecError> {
    let frame = encode(message)?;
    writer.write_all(&frame).await?;
    Ok(())
}
