//! Tally relay server binary.
//!
//! # Usage
//!
//! ```bash
//! tally-server --bind 0.0.0.0:4040
//! ```

use clap::Parser;
use tally_server::{Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Tally list synchronization relay
#[derive(Parser, Debug)]
#[command(name = "tally-server")]
#[command(about = "Real-time relay for shared shopping lists")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = "0.0.0.0:4040")]
    bind: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("tally relay starting");

    let server = Server::bind(ServerConfig { bind_address: args.bind }).await?;

    server.run().await?;

    Ok(())
}
