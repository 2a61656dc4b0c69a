//! Transport Layer
//!
//! A transport opens a connection to a single endpoint, writes one framed
//! request and returns the response body. Two interchangeable
//! implementations exist behind the same trait:
//!
//! - **[`http::HttpTransport`]**: the generic variant, delegating framing,
//!   connection pooling and read-to-EOF semantics to a blocking HTTP client
//! - **[`lite::LiteTransport`]**: the lightweight variant, holding one
//!   persistent socket with explicit keep-alive negotiation and a single
//!   reconnect-and-retry when a reused connection turns out stale
//!
//! A transport instance is owned by exactly one worker and never carries
//! more than one in-flight call.

pub mod framing;
pub mod http;
pub mod lite;

/// Identifies this runtime in outgoing requests, on both transports.
pub(crate) const USER_AGENT: &str = concat!("wirecall/", env!("CARGO_PKG_VERSION"));

use wirecall_common::Result;

use crate::endpoint::Endpoint;

/// One-request-at-a-time wire transport to a fixed endpoint.
pub trait Transport: Send {
    /// Writes one framed request envelope and returns the response body.
    ///
    /// The returned bytes are exactly the body: `Content-Length`-bounded
    /// when the response declares a length, read-to-EOF otherwise. A
    /// non-200 status is a transport error, not a decode attempt.
    fn round_trip(&mut self, envelope: &[u8]) -> Result<Vec<u8>>;

    /// Drops any live connection. The next call reconnects from scratch.
    fn close(&mut self);
}

/// Transport implementation selected at client construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Generic pooled-connection HTTP transport.
    Pooled,
    /// Lightweight persistent-socket transport with explicit keep-alive.
    KeepAlive,
}

/// Builds per-worker transport instances.
///
/// Constructed once by the client facade; the pool uses it whenever a new
/// worker is created. The pooled variant shares one underlying HTTP client
/// (and therefore one connection pool) across all workers, while each
/// keep-alive transport owns its own socket.
pub(crate) enum TransportFactory {
    Pooled { client: reqwest::blocking::Client },
    KeepAlive { keep_alive: bool },
}

impl TransportFactory {
    pub(crate) fn create(&self, endpoint: &Endpoint) -> Box<dyn Transport> {
        match self {
            TransportFactory::Pooled { client } => Box::new(http::HttpTransport::new(
                client.clone(),
                endpoint.clone(),
            )),
            TransportFactory::KeepAlive { keep_alive } => Box::new(lite::LiteTransport::new(
                endpoint.clone(),
                *keep_alive,
            )),
        }
    }
}

/// Resolves and connects to the endpoint, trying each resolved address
/// until one succeeds.
///
/// No connect or read timeout is applied: a hung remote end blocks the
/// calling worker until the platform socket layer gives up.
pub(crate) fn connect(endpoint: &Endpoint) -> Result<std::net::TcpStream> {
    use std::net::{TcpStream, ToSocketAddrs};
    use wirecall_common::WirecallError;

    let authority = endpoint.authority();
    let socket_addrs = authority.to_socket_addrs().map_err(|e| {
        WirecallError::Transport(format!("invalid address '{}': {}", authority, e))
    })?;

    let mut last_err = None;
    for socket_addr in socket_addrs {
        match TcpStream::connect(socket_addr) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_err = Some(e),
        }
    }

    Err(WirecallError::Transport(format!(
        "failed to connect to {}: {}",
        authority,
        last_err
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no addresses resolved".to_string())
    )))
}
