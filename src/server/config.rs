use std::time::Duration;

use serde::Deserialize;

use crate::ttlv::wire::DEFAULT_MAX_MESSAGE_SIZE;

/// The recognized server options.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub host: String,

    /// Port the TCP listener binds to; 0 picks an ephemeral port.
    pub port: u16,

    /// Hard cap on a single top-level TTLV item; a request announcing
    /// more resets the connection. 1 MiB by default.
    pub max_message_size: usize,

    /// Wall-clock bound on one request, in seconds; on expiry the
    /// connection is closed without a partial response. 30 s by default.
    pub request_timeout_secs: u64,

    /// Concurrent connection cap; 0 means unlimited. Connections above
    /// the cap are accepted and immediately closed.
    pub max_connections: usize,

    /// Log hex dumps of framed requests and responses at debug level.
    pub log_traffic: bool,

    /// Enforce zero padding, UTF-8 and the Boolean bit pattern on
    /// inbound items. On by default for a server; client-side parsers
    /// typically relax it.
    pub strict_validation: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 5696,
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            request_timeout_secs: 30,
            max_connections: 0,
            log_traffic: false,
            strict_validation: true,
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
