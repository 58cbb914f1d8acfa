//! TCP chat server.
//!
//! Accepts line-delimited JSON over TCP and relays chat messages to every
//! joined participant.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatline-server
//! cargo run --bin chatline-server -- --host 0.0.0.0 --port 4000
//! ```

use std::time::Duration;

use chatline_server::{Server, ServerConfig};
use chatline_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatline-server")]
#[command(about = "TCP chat server with broadcast support", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "12345")]
    port: u16,

    /// Seconds a new connection has to send its join message
    #[arg(long, default_value = "30")]
    handshake_timeout: u64,

    /// Seconds of silence before a joined client is disconnected (0 = never)
    #[arg(long, default_value = "300")]
    idle_timeout: u64,

    /// Seconds to wait for open connections on shutdown
    #[arg(long, default_value = "5")]
    drain_timeout: u64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let config = ServerConfig::with_addr(args.host, args.port)
        .handshake_timeout(Duration::from_secs(args.handshake_timeout))
        .idle_timeout(Duration::from_secs(args.idle_timeout))
        .drain_timeout(Duration::from_secs(args.drain_timeout));

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
