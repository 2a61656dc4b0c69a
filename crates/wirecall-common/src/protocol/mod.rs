//! Wirecall Protocol Layer
//!
//! Core protocol types: the call model, the error taxonomy, and the fault
//! translator that turns a fault payload into a typed [`WirecallError`].

pub mod call;
pub mod error;
pub mod fault;

pub use call::{Call, MethodName, RpcValue};
pub use error::{Result, WirecallError};
pub use fault::translate_fault;
