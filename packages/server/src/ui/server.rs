//! Server execution logic.

use std::{future::Future, io, net::SocketAddr, sync::Arc, time::Duration};

use chatline_shared::time::{Clock, SystemClock};
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{
    config::ServerConfig,
    domain::{ClientRegistry, MessagePusher},
    infrastructure::{message_pusher::Broadcaster, repository::InMemoryClientRegistry},
    usecase::{ConnectParticipantUseCase, DisconnectParticipantUseCase, SendMessageUseCase},
};

use super::{handler::ConnectionHandler, signal::shutdown_signal, state::AppState};

/// Back-off after a failed accept (e.g. the process ran out of file descriptors)
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// TCP chat server
///
/// Owns the shared state and runs the accept loop. Every accepted
/// connection gets its own handler task.
///
/// # Example
///
/// ```ignore
/// let server = Server::new(ServerConfig::with_addr("0.0.0.0", 12345));
/// server.run().await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance with an empty in-memory registry
    pub fn new(config: ServerConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a new Server instance that stamps messages with `clock`
    pub fn with_clock(config: ServerConfig, clock: Arc<dyn Clock>) -> Self {
        // Initialize dependencies in order:
        // 1. Registry
        // 2. MessagePusher
        // 3. UseCases
        let registry: Arc<dyn ClientRegistry> = Arc::new(InMemoryClientRegistry::new());
        let message_pusher: Arc<dyn MessagePusher> = Arc::new(Broadcaster::new(registry.clone()));

        let connect_participant_usecase = ConnectParticipantUseCase::new(
            registry.clone(),
            message_pusher.clone(),
            clock.clone(),
        );
        let disconnect_participant_usecase =
            DisconnectParticipantUseCase::new(registry.clone(), message_pusher.clone());
        let send_message_usecase = SendMessageUseCase::new(message_pusher.clone(), clock);

        Self {
            state: Arc::new(AppState {
                config,
                registry,
                message_pusher,
                connect_participant_usecase,
                disconnect_participant_usecase,
                send_message_usecase,
            }),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }

    /// Registry of joined participants
    pub fn registry(&self) -> Arc<dyn ClientRegistry> {
        self.state.registry.clone()
    }

    /// Bind the configured address and serve until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = self.state.config.bind_address();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;

        tracing::info!("Chat server listening on {}", listener.local_addr()?);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Accept connections on `listener` until `shutdown` resolves
    ///
    /// After `shutdown` the listener is closed, every session is asked to
    /// close, and handlers get up to `drain_timeout` to finish.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let root_token = CancellationToken::new();
        let tracker = TaskTracker::new();

        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Shutdown requested, no longer accepting connections");
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((socket, peer_addr)) => {
                        self.spawn_connection(socket, peer_addr, &tracker, &root_token);
                    }
                    Err(e) => {
                        tracing::error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        drop(listener);
        tracker.close();
        root_token.cancel();

        let drain_timeout = self.state.config.drain_timeout;
        if tokio::time::timeout(drain_timeout, tracker.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                "{} connection(s) still open after {:?}, giving up on drain",
                tracker.len(),
                drain_timeout
            );
        }

        if self
            .state
            .disconnect_participant_usecase
            .has_remaining_participants()
            .await
        {
            tracing::warn!(
                "{} participant(s) still registered at shutdown",
                self.state.registry.count().await
            );
        }

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    fn spawn_connection(
        &self,
        socket: TcpStream,
        peer_addr: SocketAddr,
        tracker: &TaskTracker,
        root_token: &CancellationToken,
    ) {
        if self.state.config.tcp_nodelay
            && let Err(e) = socket.set_nodelay(true)
        {
            tracing::warn!("Failed to set TCP_NODELAY for {}: {}", peer_addr, e);
        }

        tracing::debug!("Accepted connection from {}", peer_addr);

        let (handler, writer, outbound) =
            ConnectionHandler::new(socket, peer_addr, self.state.clone(), root_token.child_token());
        tracker.spawn(handler.run(writer, outbound));
    }
}
