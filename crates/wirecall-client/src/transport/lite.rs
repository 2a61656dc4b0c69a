//! Lightweight Keep-Alive Transport
//!
//! Holds one persistent socket across calls when both ends agree to
//! keep-alive. Framing is done by hand (see [`super::framing`]); no generic
//! HTTP client is involved.
//!
//! Keep-alive is negotiated per response: the socket is kept only when
//! reuse is desired, the response is `Content-Length`-framed, and the
//! response either granted keep-alive explicitly or reported HTTP/1.1.
//! Otherwise the socket is dropped as soon as the body has been fully
//! consumed.
//!
//! A write failure on a connection that has already carried a request is
//! almost always the peer having idled it out server-side, so it triggers
//! exactly one reconnect-and-retry. A failure on a fresh connection
//! propagates immediately.

use std::io::{BufReader, Read, Write};
use std::net::TcpStream;

use wirecall_common::{Result, WirecallError};

use crate::endpoint::Endpoint;
use crate::transport::{self, framing, Transport};

/// Connection opener, kept as a seam so tests can inject scripted streams.
pub(crate) trait Dialer: Send {
    type Stream: Read + Write + Send;

    fn dial(&self, endpoint: &Endpoint) -> Result<Self::Stream>;
}

pub(crate) struct TcpDialer;

impl Dialer for TcpDialer {
    type Stream = TcpStream;

    fn dial(&self, endpoint: &Endpoint) -> Result<TcpStream> {
        transport::connect(endpoint)
    }
}

struct Conn<S> {
    reader: BufReader<S>,
    /// Whether this connection has carried at least one complete call.
    used: bool,
}

pub struct LiteTransport<D: Dialer = TcpDialer> {
    dialer: D,
    endpoint: Endpoint,
    keep_alive_desired: bool,
    conn: Option<Conn<D::Stream>>,
}

impl LiteTransport<TcpDialer> {
    pub(crate) fn new(endpoint: Endpoint, keep_alive_desired: bool) -> Self {
        Self::with_dialer(TcpDialer, endpoint, keep_alive_desired)
    }
}

impl<D: Dialer> LiteTransport<D> {
    pub(crate) fn with_dialer(dialer: D, endpoint: Endpoint, keep_alive_desired: bool) -> Self {
        Self {
            dialer,
            endpoint,
            keep_alive_desired,
            conn: None,
        }
    }

    fn open(&self) -> Result<Conn<D::Stream>> {
        let stream = self.dialer.dial(&self.endpoint)?;
        Ok(Conn {
            reader: BufReader::new(stream),
            used: false,
        })
    }
}

impl<D: Dialer> Transport for LiteTransport<D> {
    fn round_trip(&mut self, envelope: &[u8]) -> Result<Vec<u8>> {
        let retry_allowed = self.conn.as_ref().map_or(false, |c| c.used);
        // Taken out of self so that any error path drops (and closes) it.
        let mut conn = match self.conn.take() {
            Some(conn) => conn,
            None => self.open()?,
        };

        let sent = framing::write_request(
            conn.reader.get_mut(),
            &self.endpoint,
            envelope,
            self.keep_alive_desired,
        );
        if let Err(err) = sent {
            if !retry_allowed {
                return Err(WirecallError::Transport(format!("writing request: {}", err)));
            }
            // The peer most likely idled the connection out server-side; a
            // single fresh connection attempt almost always succeeds.
            tracing::debug!(
                error = %err,
                endpoint = %self.endpoint,
                "write on reused connection failed, reconnecting"
            );
            drop(conn);
            conn = self.open()?;
            framing::write_request(
                conn.reader.get_mut(),
                &self.endpoint,
                envelope,
                self.keep_alive_desired,
            )
            .map_err(|e| {
                WirecallError::Transport(format!("writing request after reconnect: {}", e))
            })?;
        }

        let head = framing::read_head(&mut conn.reader)?;
        let body = framing::read_body(&mut conn.reader, head.content_length)?;

        // Without a declared length the stream position is only known at
        // EOF, so the connection cannot carry another call either way.
        let keepalive = self.keep_alive_desired
            && head.content_length.is_some()
            && (head.keep_alive_granted || head.http_11);
        if keepalive {
            conn.used = true;
            self.conn = Some(conn);
        }
        Ok(body)
    }

    fn close(&mut self) {
        self.conn = None;
    }
}
