//! Server configuration

use std::time::Duration;

use chatline_shared::protocol::DEFAULT_MAX_FRAME_LENGTH;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,

    /// Port number to bind to
    pub port: u16,

    /// The first frame (join) must arrive within this time
    pub handshake_timeout: Duration,

    /// Disconnect a joined session if nothing is received for this long
    /// (`None` = never)
    pub idle_timeout: Option<Duration>,

    /// How long shutdown waits for connection handlers to finish
    pub drain_timeout: Duration,

    /// Frames that may wait in one session's outbound queue
    pub outbound_queue_capacity: usize,

    /// Upper bound for one inbound frame in bytes
    pub max_frame_length: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 12345,
            handshake_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(300)),
            drain_timeout: Duration::from_secs(5),
            outbound_queue_capacity: 256,
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            tcp_nodelay: true, // chat lines are tiny; latency matters more than batching
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind host and port
    pub fn with_addr(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// `host:port` string passed to the listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Set handshake timeout
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Set idle timeout; a zero duration disables it
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Set drain timeout
    pub fn drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Set per-session outbound queue capacity
    pub fn outbound_queue_capacity(mut self, capacity: usize) -> Self {
        self.outbound_queue_capacity = capacity.max(1);
        self
    }

    /// Set maximum inbound frame length
    pub fn max_frame_length(mut self, length: usize) -> Self {
        self.max_frame_length = length;
        self
    }
}
