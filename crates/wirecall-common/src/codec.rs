//! Envelope Codec Seam
//!
//! The XML encoding and decoding of RPC envelopes is owned by the embedder,
//! not by this runtime. The runtime only needs two operations: serialize a
//! method call into request bytes, and stream-parse a response body into
//! either a result value or a fault payload. This module defines that seam.

use std::io::{Read, Write};

use crate::protocol::call::RpcValue;
use crate::protocol::error::Result;

/// Outcome of parsing a method-response body.
///
/// If the decoder observes a fault marker before normal content, the
/// subsequently parsed value is the fault payload rather than a result.
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// The call succeeded; this is the decoded result value.
    Value(RpcValue),
    /// The remote end returned a fault envelope; this is the fault payload,
    /// to be handed to [`translate_fault`](crate::protocol::translate_fault).
    Fault(RpcValue),
}

/// Envelope encoder/decoder supplied by the embedder.
///
/// Implementations must be shareable across workers; one codec instance
/// serves every call made through a client.
///
/// # Error contract
///
/// A response body that cannot be parsed at all is a transport-level
/// failure: `read_response` must report it as
/// [`WirecallError::Transport`](crate::protocol::WirecallError::Transport).
/// A well-formed fault envelope is *not* an error here; it is returned as
/// [`Parsed::Fault`] and translated by the caller.
pub trait Codec: Send + Sync {
    /// Serializes a method call envelope into `out`.
    ///
    /// The runtime computes `Content-Length` from the exact number of bytes
    /// written, so implementations must not pad or buffer beyond `out`.
    fn write_request(&self, out: &mut dyn Write, method: &str, params: &[RpcValue]) -> Result<()>;

    /// Stream-parses a response body.
    fn read_response(&self, body: &mut dyn Read) -> Result<Parsed>;
}
