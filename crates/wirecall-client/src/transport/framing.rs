//! Manual HTTP Framing
//!
//! Request writing and response-head parsing for the lightweight transport,
//! which speaks HTTP over a raw socket without a generic HTTP client. The
//! parser is a small state machine: status line, then headers until a blank
//! line, then a body bounded by `Content-Length` (or by end-of-stream when
//! the header is absent).

use std::io::{BufRead, Read, Write};

use wirecall_common::{Result, WirecallError};

use crate::endpoint::Endpoint;

use super::USER_AGENT;

/// Upper bound on a single header line. A longer line means either a
/// hostile peer or framing desync on a reused connection; both are fatal.
pub(crate) const MAX_HEADER_LINE: usize = 4096;

/// Upper bound on a declared response body.
const MAX_BODY_SIZE: usize = 100 * 1024 * 1024; // 100 MB

/// Writes one framed request.
///
/// `Content-Length` is the exact byte length of the already-encoded
/// envelope, never an estimate.
pub(crate) fn write_request(
    w: &mut dyn Write,
    endpoint: &Endpoint,
    envelope: &[u8],
    keep_alive: bool,
) -> std::io::Result<()> {
    write!(w, "POST {} HTTP/1.0\r\n", endpoint.path())?;
    write!(w, "User-Agent: {}\r\n", USER_AGENT)?;
    write!(w, "Host: {}\r\n", endpoint.authority())?;
    write!(w, "Content-Type: text/xml\r\n")?;
    write!(w, "Content-Length: {}\r\n", envelope.len())?;
    if let Some(authorization) = endpoint.authorization() {
        write!(w, "Authorization: {}\r\n", authorization)?;
    }
    if keep_alive {
        write!(w, "Connection: Keep-Alive\r\n")?;
    }
    write!(w, "\r\n")?;
    w.write_all(envelope)?;
    w.flush()
}

/// Parsed response status line and headers.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct ResponseHead {
    /// The response reported protocol version 1.1.
    pub http_11: bool,
    /// The response carried `Connection: keep-alive`.
    pub keep_alive_granted: bool,
    pub content_length: Option<usize>,
}

/// Reads the status line and headers up to the blank separator line.
///
/// Anything but a "200" status is a transport error; the body of an error
/// response is never handed to the decoder.
pub(crate) fn read_head(r: &mut impl BufRead) -> Result<ResponseHead> {
    let status_line = read_line(r)?;
    let mut tokens = status_line.split_whitespace();
    let version = tokens.next().unwrap_or("");
    let status = tokens.next().unwrap_or("");

    if !version.starts_with("HTTP/") || status.is_empty() {
        return Err(WirecallError::Transport(format!(
            "malformed status line: {:?}",
            status_line
        )));
    }
    if status != "200" {
        return Err(WirecallError::Transport(format!(
            "unexpected HTTP status: {}",
            status_line
        )));
    }

    let mut head = ResponseHead {
        http_11: version == "HTTP/1.1",
        keep_alive_granted: false,
        content_length: None,
    };

    loop {
        let line = read_line(r)?;
        if line.is_empty() {
            break;
        }
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if name.eq_ignore_ascii_case("content-length") {
            let length = value.parse::<usize>().map_err(|_| {
                WirecallError::Transport(format!("invalid Content-Length: {:?}", value))
            })?;
            if length > MAX_BODY_SIZE {
                return Err(WirecallError::Transport(format!(
                    "response too large: {} bytes (max {} bytes)",
                    length, MAX_BODY_SIZE
                )));
            }
            head.content_length = Some(length);
        } else if name.eq_ignore_ascii_case("connection") {
            head.keep_alive_granted = value.eq_ignore_ascii_case("keep-alive");
        }
    }

    Ok(head)
}

/// Reads the response body.
///
/// With a declared length, exactly that many bytes are consumed and no
/// more; consuming fewer or more would corrupt keep-alive pipelining.
/// Without one, the body runs until end-of-stream.
pub(crate) fn read_body(r: &mut impl Read, content_length: Option<usize>) -> Result<Vec<u8>> {
    match content_length {
        Some(length) => {
            let mut body = vec![0u8; length];
            r.read_exact(&mut body)
                .map_err(|e| WirecallError::Transport(format!("reading response body: {}", e)))?;
            Ok(body)
        }
        None => {
            let mut body = Vec::new();
            r.read_to_end(&mut body)
                .map_err(|e| WirecallError::Transport(format!("reading response body: {}", e)))?;
            Ok(body)
        }
    }
}

/// Reads one CRLF-terminated line, byte at a time, with an upper bound.
fn read_line(r: &mut impl BufRead) -> Result<String> {
    let mut line = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        match r.read(&mut byte) {
            Ok(0) => {
                if line.is_empty() {
                    return Err(WirecallError::Transport(
                        "connection closed while reading response head".to_string(),
                    ));
                }
                break;
            }
            Ok(_) => {
                if byte[0] == b'\n' {
                    break;
                }
                if byte[0] != b'\r' {
                    line.push(byte[0]);
                }
                if line.len() > MAX_HEADER_LINE {
                    return Err(WirecallError::Transport(format!(
                        "header line exceeds {} bytes",
                        MAX_HEADER_LINE
                    )));
                }
            }
            Err(e) => {
                return Err(WirecallError::Transport(format!(
                    "reading response head: {}",
                    e
                )))
            }
        }
    }
    String::from_utf8(line)
        .map_err(|_| WirecallError::Transport("non-UTF-8 bytes in response head".to_string()))
}
