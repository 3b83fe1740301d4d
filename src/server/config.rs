//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Listener and connection limits.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// Size of each socket read.
    pub read_buffer_size: usize,
    /// Largest accepted request head (request line plus headers).
    pub max_header_size: usize,
    /// Largest accepted request body.
    pub max_body_size: usize,
    /// How long shutdown waits for in-flight connections.
    pub shutdown_timeout: Duration,
}

impl ServerConfig {
    /// Listen on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], port)),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_connections: 1024,
            read_buffer_size: 8192,
            max_header_size: 16 * 1024,
            max_body_size: 1024 * 1024,
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}
