use serde::{Deserialize, Serialize};

use crate::protocol::error::{Result, WirecallError};

/// Name of a remote method.
pub type MethodName = String;

/// A typed argument, result or fault payload value.
///
/// The runtime never inspects values beyond fault translation; conversion
/// between host types and wire types belongs to the external codec.
pub type RpcValue = serde_json::Value;

/// One remote procedure call: a method name plus an ordered argument list.
///
/// Consumed by exactly one worker and discarded after completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Call {
    pub method: MethodName,
    pub params: Vec<RpcValue>,
}

impl Call {
    /// Creates a call, rejecting an empty method name.
    pub fn new(method: impl Into<String>, params: Vec<RpcValue>) -> Result<Self> {
        let method = method.into();
        if method.is_empty() {
            return Err(WirecallError::InvalidRequest(
                "method name must not be empty".to_string(),
            ));
        }
        Ok(Call { method, params })
    }
}
