//! Interactive TCP chat client with reconnection support.
//!
//! Joins the chat under a username, sends every typed line as a chat message
//! and prints what others say. `/quit` leaves, `/ping` tests the connection,
//! `/help` lists the commands. Reconnects on connection loss (max 5 attempts
//! with 5 second interval); a rejected username ends the client.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatline-client -- --username alice
//! cargo run --bin chatline-client -- -H 10.0.0.5 -p 4000 -u bob
//! ```

use chatline_shared::logger::setup_logger;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatline-client")]
#[command(about = "TCP chat client with broadcast support and unique usernames", long_about = None)]
struct Args {
    /// Username shown to other participants (must be unique)
    #[arg(short = 'u', long)]
    username: String,

    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short = 'p', long, default_value = "12345")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "warn");

    let args = Args::parse();

    if let Err(e) = chatline_client::run_client(args.host, args.port, args.username).await {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
