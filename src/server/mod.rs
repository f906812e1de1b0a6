//! The request/response server: configuration, the per-request
//! context, the operation mux, the protocol engine and the TCP socket
//! server.

mod config;
mod context;
mod discover_versions;
mod mux;
mod protocol;
mod socket_server;

pub use config::ServerConfig;
pub use context::RequestContext;
pub use discover_versions::DiscoverVersionsHandler;
pub use mux::{ItemHandler, OperationMux};
pub use protocol::{Disposition, ProtocolEngine};
pub use socket_server::{SocketServer, SocketServerHandle};
