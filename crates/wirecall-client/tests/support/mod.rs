//! Shared test fixtures: a JSON-envelope codec and a minimal HTTP server
//! backed by a real `TcpListener`.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use wirecall_common::codec::{Codec, Parsed};
use wirecall_common::{Result, RpcValue, WirecallError};

/// Codec that writes calls as `{"method": ..., "params": [...]}` and reads
/// responses as `{"value": ...}` or `{"fault": {...}}`. The runtime never
/// looks inside envelopes, so JSON stands in for XML here.
pub struct TestCodec;

impl Codec for TestCodec {
    fn write_request(
        &self,
        out: &mut dyn Write,
        method: &str,
        params: &[RpcValue],
    ) -> Result<()> {
        let envelope = serde_json::json!({ "method": method, "params": params });
        serde_json::to_writer(out, &envelope)
            .map_err(|e| WirecallError::Transport(format!("encoding request: {}", e)))
    }

    fn read_response(&self, body: &mut dyn Read) -> Result<Parsed> {
        let value: Value = serde_json::from_reader(body)
            .map_err(|e| WirecallError::Transport(format!("unparseable response: {}", e)))?;
        if let Some(fault) = value.get("fault") {
            Ok(Parsed::Fault(fault.clone()))
        } else {
            Ok(Parsed::Value(value.get("value").cloned().unwrap_or(Value::Null)))
        }
    }
}

/// A decoded test request.
pub struct TestRequest {
    pub method: String,
    pub params: Vec<Value>,
    /// Raw header lines as received, so tests can assert on emission.
    pub headers: Vec<String>,
}

impl TestRequest {
    /// Full header line for `name` (case-insensitive), if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.headers
            .iter()
            .find(|h| h.to_ascii_lowercase().starts_with(&prefix))
            .map(String::as_str)
    }
}

/// What the server should send back for one request.
pub struct TestResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Option<Duration>,
}

impl TestResponse {
    pub fn value(value: Value) -> Self {
        Self::body(serde_json::json!({ "value": value }))
    }

    pub fn fault(code: i64, message: &str) -> Self {
        Self::body(serde_json::json!({
            "fault": { "faultCode": code, "faultString": message }
        }))
    }

    pub fn status(status: u16) -> Self {
        TestResponse {
            status,
            body: Vec::new(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn body(value: Value) -> Self {
        TestResponse {
            status: 200,
            body: serde_json::to_vec(&value).unwrap(),
            delay: None,
        }
    }
}

pub type Handler = Arc<dyn Fn(TestRequest) -> TestResponse + Send + Sync>;

/// Minimal keep-alive HTTP server on an ephemeral port. Each accepted
/// connection gets its own thread and serves requests until the client
/// hangs up. Counts connections and requests so tests can assert on
/// connection reuse.
pub struct TestServer {
    addr: SocketAddr,
    connections: Arc<AtomicUsize>,
    requests: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn spawn(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let connections = Arc::new(AtomicUsize::new(0));
        let requests = Arc::new(AtomicUsize::new(0));

        let conn_counter = Arc::clone(&connections);
        let req_counter = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                conn_counter.fetch_add(1, Ordering::SeqCst);
                let handler = Arc::clone(&handler);
                let req_counter = Arc::clone(&req_counter);
                thread::spawn(move || serve_connection(stream, handler, req_counter));
            }
        });

        TestServer {
            addr,
            connections,
            requests,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/RPC2", self.addr)
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

fn serve_connection(stream: TcpStream, handler: Handler, requests: Arc<AtomicUsize>) {
    let mut reader = BufReader::new(stream.try_clone().unwrap());
    let mut stream = stream;

    loop {
        let mut content_length = 0usize;
        let mut saw_request_line = false;
        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => return, // client hung up
                Ok(_) => {}
                Err(_) => return,
            }
            let line = line.trim_end();
            if line.is_empty() {
                if !saw_request_line {
                    return;
                }
                break;
            }
            if saw_request_line {
                headers.push(line.to_string());
            }
            saw_request_line = true;
            if let Some(value) = line
                .to_ascii_lowercase()
                .strip_prefix("content-length:")
                .map(str::trim)
                .and_then(|v| v.parse().ok())
            {
                content_length = value;
            }
        }

        let mut body = vec![0u8; content_length];
        if reader.read_exact(&mut body).is_err() {
            return;
        }
        requests.fetch_add(1, Ordering::SeqCst);

        let envelope: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        let request = TestRequest {
            method: envelope
                .get("method")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            params: envelope
                .get("params")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            headers,
        };

        let response = handler(request);
        if let Some(delay) = response.delay {
            thread::sleep(delay);
        }

        let reason = if response.status == 200 { "OK" } else { "Error" };
        let head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: keep-alive\r\n\r\n",
            response.status,
            reason,
            response.body.len()
        );
        if stream.write_all(head.as_bytes()).is_err()
            || stream.write_all(&response.body).is_err()
            || stream.flush().is_err()
        {
            return;
        }
    }
}
