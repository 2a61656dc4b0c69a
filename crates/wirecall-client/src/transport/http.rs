//! Generic Pooled HTTP Transport
//!
//! Delegates connection management to a blocking HTTP client: the client
//! owns a process-level connection pool, negotiates keep-alive on its own
//! and reads bodies to EOF when no `Content-Length` is declared. All
//! workers built from one facade share the same underlying pool, while each
//! worker still holds its own transport value.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use wirecall_common::{Result, WirecallError};

use crate::endpoint::Endpoint;
use crate::transport::Transport;

pub struct HttpTransport {
    client: Client,
    endpoint: Endpoint,
    url: String,
}

impl HttpTransport {
    pub(crate) fn new(client: Client, endpoint: Endpoint) -> Self {
        let url = endpoint.url();
        Self {
            client,
            endpoint,
            url,
        }
    }
}

impl Transport for HttpTransport {
    fn round_trip(&mut self, envelope: &[u8]) -> Result<Vec<u8>> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "text/xml")
            .body(envelope.to_vec());
        if let Some(auth) = self.endpoint.auth() {
            request = request.basic_auth(&auth.user, Some(&auth.password));
        }

        let response = request
            .send()
            .map_err(|e| WirecallError::Transport(format!("sending request: {}", e)))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(WirecallError::Transport(format!(
                "unexpected HTTP status: {}",
                status
            )));
        }

        let body = response
            .bytes()
            .map_err(|e| WirecallError::Transport(format!("reading response body: {}", e)))?;
        Ok(body.to_vec())
    }

    fn close(&mut self) {
        // Connections live in the shared pool; nothing to tear down here.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;

    /// Serves a single canned HTTP exchange on a random port.
    fn one_shot_server(response: &'static [u8]) -> (String, std::thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();
            reader.get_mut().write_all(response).unwrap();
            body
        });
        (addr, handle)
    }

    #[test]
    fn test_round_trip_returns_body() {
        let (addr, server) =
            one_shot_server(b"HTTP/1.1 200 OK\r\nContent-Length: 6\r\nConnection: close\r\n\r\nresult");
        let endpoint = Endpoint::parse(&format!("http://{}/RPC2", addr)).unwrap();
        let mut transport = HttpTransport::new(Client::new(), endpoint);

        let body = transport.round_trip(b"<call/>").unwrap();
        assert_eq!(body, b"result");
        assert_eq!(server.join().unwrap(), b"<call/>");
    }

    #[test]
    fn test_non_200_status_is_transport_error() {
        let (addr, _server) = one_shot_server(
            b"HTTP/1.1 500 Internal Server Error\r\nContent-Length: 4\r\nConnection: close\r\n\r\noops",
        );
        let endpoint = Endpoint::parse(&format!("http://{}/RPC2", addr)).unwrap();
        let mut transport = HttpTransport::new(Client::new(), endpoint);

        let err = transport.round_trip(b"<call/>").unwrap_err();
        assert!(matches!(err, WirecallError::Transport(_)));
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_connection_refused_is_transport_error() {
        let endpoint = Endpoint::parse("http://127.0.0.1:1/RPC2").unwrap();
        let mut transport = HttpTransport::new(Client::new(), endpoint);
        let err = transport.round_trip(b"<call/>").unwrap_err();
        assert!(matches!(err, WirecallError::Transport(_)));
    }
}
