//! KMIP TTLV socket server binary: serves Discover Versions out of the
//! box; real deployments register their operation handlers on the mux
//! through the library API.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use kmipd::{
    error::result::KmipResult,
    kmip_1_4::kmip_types::OperationEnumeration,
    server::{
        DiscoverVersionsHandler, OperationMux, ProtocolEngine, ServerConfig, SocketServer,
    },
};

#[derive(Parser, Debug)]
#[command(name = "kmipd", about = "KMIP TTLV socket server", version)]
struct Cli {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind; 0 picks an ephemeral port
    #[arg(long, default_value_t = 5696)]
    port: u16,

    /// Cap on a single TTLV message, in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    max_message_size: usize,

    /// Wall-clock bound on one request, in seconds
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// Concurrent connection cap; 0 means unlimited
    #[arg(long, default_value_t = 0)]
    max_connections: usize,

    /// Log hex dumps of framed requests and responses
    #[arg(long)]
    log_traffic: bool,

    /// Relax padding, UTF-8 and Boolean checks on inbound items
    #[arg(long)]
    lenient_validation: bool,
}

impl From<Cli> for ServerConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            max_message_size: cli.max_message_size,
            request_timeout_secs: cli.request_timeout_secs,
            max_connections: cli.max_connections,
            log_traffic: cli.log_traffic,
            strict_validation: !cli.lenient_validation,
        }
    }
}

fn main() -> KmipResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_e| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::from(Cli::parse());

    let mut mux = OperationMux::new();
    mux.handle(
        OperationEnumeration::DISCOVER_VERSIONS,
        Arc::new(DiscoverVersionsHandler::default()),
    );

    let engine = Arc::new(ProtocolEngine::new(config, mux));
    let server = SocketServer::new(engine);
    let handle = server.start()?;
    handle.wait()
}
