//! Worker Call Lifecycle
//!
//! A worker owns one transport across calls (for connection reuse) and
//! serializes a single call end-to-end: encode, transport, decode,
//! translate. Calls on one worker are strictly sequential; call N+1 never
//! starts before call N's response has been fully consumed.
//!
//! A transport-level failure (including an unparseable response, whose
//! framing state is unknown) marks the worker faulted so the pool discards
//! it instead of blindly reusing the connection. A protocol fault does not:
//! the connection is proven healthy, only the remote call was rejected.

use std::sync::Arc;
use std::time::Instant;

use wirecall_common::codec::{Codec, Parsed};
use wirecall_common::{translate_fault, Call, Result, RpcValue};

use crate::pool::RoundTripEstimate;
use crate::transport::Transport;

pub(crate) struct Worker {
    transport: Box<dyn Transport>,
    faulted: bool,
    round_trip: Arc<RoundTripEstimate>,
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("faulted", &self.faulted)
            .finish_non_exhaustive()
    }
}

impl Worker {
    pub(crate) fn new(transport: Box<dyn Transport>, round_trip: Arc<RoundTripEstimate>) -> Self {
        Self {
            transport,
            faulted: false,
            round_trip,
        }
    }

    pub(crate) fn is_faulted(&self) -> bool {
        self.faulted
    }

    /// Runs one call end-to-end.
    ///
    /// Every completed call (success or protocol fault) updates the shared
    /// round-trip estimate with wall-clock elapsed time; a pure transport
    /// failure does not, because its elapsed time is not representative.
    pub(crate) fn execute(&mut self, call: &Call, codec: &dyn Codec) -> Result<RpcValue> {
        let started = Instant::now();

        let mut envelope = Vec::new();
        codec.write_request(&mut envelope, &call.method, &call.params)?;

        let body = match self.transport.round_trip(&envelope) {
            Ok(body) => body,
            Err(err) => {
                self.faulted = true;
                return Err(err);
            }
        };

        let parsed = match codec.read_response(&mut body.as_slice()) {
            Ok(parsed) => parsed,
            Err(err) => {
                self.faulted = true;
                return Err(err);
            }
        };

        self.round_trip.record(started.elapsed());
        match parsed {
            Parsed::Value(value) => Ok(value),
            Parsed::Fault(payload) => Err(translate_fault(&payload)),
        }
    }

    #[cfg(test)]
    pub(crate) fn force_fault(&mut self) {
        self.faulted = true;
    }
}
