//! Wirecall Client Runtime
//!
//! An XML-RPC client runtime: turns a method name and argument list into a
//! wire request, transports it to a remote endpoint, parses the response
//! and returns either a result value or a typed failure, synchronously or
//! asynchronously, with bounded concurrency and connection reuse.
//!
//! # Architecture
//!
//! ```text
//! Client facade -> WorkerPool -> Worker -> Transport -> fault translation
//! ```
//!
//! - **[`Client`]**: the single entry point, exposing [`Client::execute`]
//!   and [`Client::execute_async`]
//! - **Worker pool**: bounded collection of reusable workers, each owning
//!   one transport for connection reuse; saturation fails fast with
//!   `Overload`
//! - **Call queue**: unbounded FIFO of pending asynchronous calls, drained
//!   by whichever worker next becomes free
//! - **Transports**: a generic pooled HTTP transport and a lightweight
//!   persistent-socket transport with explicit keep-alive and one-shot
//!   reconnect-and-retry, selected via [`TransportKind`]
//!
//! The XML envelope codec is external: callers supply an implementation of
//! [`wirecall_common::codec::Codec`].
//!
//! # Scheduling model
//!
//! One OS thread per in-flight call. Synchronous calls block their caller's
//! thread; asynchronous calls either run on a freshly spawned worker thread
//! or wait in the call queue. There is no event loop and no cancellation;
//! network I/O blocks the executing thread with no timeout enforced by the
//! runtime itself.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wirecall_client::Client;
//! # use std::io::{Read, Write};
//! # use wirecall_common::codec::{Codec, Parsed};
//! # use wirecall_common::{Result, RpcValue};
//! # struct XmlCodec;
//! # impl Codec for XmlCodec {
//! #     fn write_request(&self, _: &mut dyn Write, _: &str, _: &[RpcValue]) -> Result<()> { Ok(()) }
//! #     fn read_response(&self, _: &mut dyn Read) -> Result<Parsed> { Ok(Parsed::Value(RpcValue::Null)) }
//! # }
//!
//! # fn main() -> wirecall_common::Result<()> {
//! let client = Client::new("http://localhost:8080/RPC2", Arc::new(XmlCodec))?;
//! let sum = client.execute("math.add", vec![1.into(), 2.into()])?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod pool;
pub mod queue;
pub mod transport;
pub mod worker;

pub use client::{AsyncCallback, Client, DIRECT_DISPATCH_LIMIT};
pub use config::ClientConfig;
pub use endpoint::Endpoint;
pub use pool::RoundTripEstimate;
pub use transport::TransportKind;
