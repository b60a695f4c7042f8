//! Huddle chat server.
//!
//! Accepts WebSocket clients per room and fans their messages out to every
//! client in the same room, locally and through the message bus.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin huddle-server
//! cargo run --bin huddle-server -- --host 0.0.0.0 --port 3000
//! ```

use clap::Parser;
use huddle_server::{
    app::{App, Collaborators, ServerConfig},
    domain::InstanceId,
    hub::{DEFAULT_INTAKE_CAPACITY, DEFAULT_OUTBOUND_CAPACITY, HubConfig},
    infrastructure::bus::{DEFAULT_BUS_CAPACITY, DEFAULT_TOPIC},
    ui::shutdown_signal,
};
use huddle_shared::logger::setup_logger;
use tokio::net::TcpListener;

#[derive(Parser, Debug)]
#[command(name = "huddle-server")]
#[command(about = "Real-time chat server with room broadcast", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Pending outbound messages per connection before it is evicted
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_CAPACITY)]
    outbound_capacity: usize,

    /// Pending hub events before producers wait
    #[arg(long, default_value_t = DEFAULT_INTAKE_CAPACITY)]
    intake_capacity: usize,

    /// Bus topic carrying chat messages
    #[arg(long, default_value = DEFAULT_TOPIC)]
    bus_topic: String,

    /// Records buffered per subscriber of the in-memory bus
    #[arg(long, default_value_t = DEFAULT_BUS_CAPACITY)]
    bus_capacity: usize,

    /// Default log level, overridden by RUST_LOG
    #[arg(long, default_value = "debug")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            hub: HubConfig {
                intake_capacity: args.intake_capacity,
                outbound_capacity: args.outbound_capacity,
            },
            bus_topic: args.bus_topic,
            bus_capacity: args.bus_capacity,
            instance_id: InstanceId::generate(),
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    let app = App::build(&config, Collaborators::in_memory(config.bus_capacity)).await;

    let listener = match TcpListener::bind((config.host.as_str(), config.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}:{}: {}", config.host, config.port, e);
            std::process::exit(1);
        }
    };
    tracing::info!("Press Ctrl+C to shutdown gracefully");

    if let Err(e) = app.serve(listener, shutdown_signal()).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
