//! Fault Translator
//!
//! Converts the decoded payload of a fault response into a typed
//! [`WirecallError::Fault`]. The payload is expected to be a keyed record
//! with a numeric `faultCode` (possibly supplied as a stringified integer)
//! and a `faultString`. Anything that does not match degrades to a generic
//! fault instead of surfacing a decoding error.

use crate::protocol::call::RpcValue;
use crate::protocol::error::WirecallError;

/// Message used when a fault payload cannot be interpreted.
const INVALID_FAULT: &str = "Invalid fault response";

/// Translates a parsed fault payload into a [`WirecallError::Fault`].
///
/// The fault string is trimmed. A payload missing either field, or carrying
/// a code that is not an integer in range, yields
/// `Fault { code: 0, message: "Invalid fault response" }`, never a panic
/// and never an unrelated error.
pub fn translate_fault(payload: &RpcValue) -> WirecallError {
    let code = payload.get("faultCode").and_then(fault_code);
    let message = payload
        .get("faultString")
        .and_then(RpcValue::as_str);

    match (code, message) {
        (Some(code), Some(message)) => WirecallError::Fault {
            code,
            message: message.trim().to_string(),
        },
        _ => WirecallError::Fault {
            code: 0,
            message: INVALID_FAULT.to_string(),
        },
    }
}

fn fault_code(value: &RpcValue) -> Option<i32> {
    if let Some(n) = value.as_i64() {
        return i32::try_from(n).ok();
    }
    value.as_str()?.trim().parse().ok()
}
