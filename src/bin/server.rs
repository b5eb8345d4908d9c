//! Real-time world-state relay server for a multiplayer block-placing world.
//!
//! Accepts WebSocket connections, assigns each a participant identity, and
//! relays every state-changing event to all other connected clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 8765
//! ```

use blockworld_relay::{common::logger::setup_logger, server::run_server};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "WebSocket state-synchronization relay for a multiplayer world", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8765")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run_server(args.host, args.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
