//! yoriai meeting server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin yoriai-server
//! cargo run --bin yoriai-server -- --host 0.0.0.0 --port 3000 --grace-period-secs 60
//! ```

use std::time::Duration;

use clap::Parser;
use yoriai_server::{
    config::ServerConfig,
    domain::DEFAULT_HISTORY_CAPACITY,
    ui::{AppState, Server},
};
use yoriai_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "yoriai-server")]
#[command(about = "Meeting server for ephemeral multi-party chat sessions", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Seconds an empty meeting is kept before it is deleted
    #[arg(long, default_value = "300")]
    grace_period_secs: u64,

    /// Number of chat messages kept per meeting
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        grace_period: Duration::from_secs(args.grace_period_secs),
        history_capacity: args.history_capacity,
    };
    tracing::info!(
        "Starting with grace period {}s, history capacity {}",
        config.grace_period.as_secs(),
        config.history_capacity
    );

    let server = Server::new(AppState::in_memory(&config));
    if let Err(e) = server.run(config.host, config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
