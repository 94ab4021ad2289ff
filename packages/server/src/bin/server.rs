//! Parlor chat relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-server
//! cargo run --bin parlor-server -- --config config.json --port 3000
//! ```

use clap::Parser;
use parlor_server::{config::ServerConfig, ui::Server};
use parlor_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "parlor-server")]
#[command(about = "TCP chat relay server", long_about = None)]
struct Args {
    /// Path to the JSON config file
    #[arg(short = 'c', long, default_value = "config.json")]
    config: String,

    /// Override the host address from the config
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// Override the port from the config
    #[arg(short = 'p', long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "debug");

    let args = Args::parse();

    let mut config = match ServerConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port.to_string();
    }
    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    tracing::info!(
        "Starting server (max_conn: {}, policy: {:?}, notify_on_leave: {})",
        config.max_conn,
        config.username_policy,
        config.notify_on_leave
    );

    if let Err(e) = Server::from_config(&config).run(&config.bind_addr()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
