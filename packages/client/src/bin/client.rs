//! Parlor CLI chat client with reconnection support.
//!
//! Connects to a Parlor server, logs in with a user name and sends lines
//! read from the terminal. `/users` lists who is online and `/quit` exits.
//! Automatically reconnects on disconnection (max 5 attempts with 5 second interval).
//! A login rejected by the server (name taken, server full) exits with status 1.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin parlor-client -- --user-name alice
//! cargo run --bin parlor-client -- -H 127.0.0.1 -p 8080 -u bob
//! ```

use clap::Parser;

use parlor_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "parlor-client")]
#[command(about = "Parlor chat client", long_about = None)]
struct Args {
    /// User name to log in with (must be unique on the server)
    #[arg(short = 'u', long)]
    user_name: String,

    /// Server host
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let addr = format!("{}:{}", args.host, args.port);

    // Run the client
    if let Err(e) = parlor_client::run_client(addr, args.user_name).await {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}
