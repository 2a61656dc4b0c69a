//! Wirecall Protocol Types
//!
//! This crate provides the protocol layer shared by the wirecall XML-RPC
//! client runtime: the call/value model, the error taxonomy, the fault
//! translator, and the codec seam behind which the XML envelope
//! encoder/decoder lives.
//!
//! # Overview
//!
//! Wirecall turns a method name and argument list into a wire request,
//! transports it to a remote endpoint, and returns either a result value or
//! a typed failure. This crate deliberately does *not* contain the XML
//! encoding itself: embedders supply a [`codec::Codec`] implementation and
//! the runtime treats envelope bytes and parsed values as opaque.
//!
//! # Components
//!
//! - [`protocol`] - [`Call`](protocol::Call), [`WirecallError`](protocol::WirecallError),
//!   and the fault translator
//! - [`codec`] - the [`Codec`](codec::Codec) trait and [`Parsed`](codec::Parsed)
//!   response classification

pub mod codec;
pub mod protocol;

pub use protocol::*;
