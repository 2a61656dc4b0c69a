use thiserror::Error;

/// Error taxonomy of the client runtime.
///
/// Only three failure classes ever reach a caller mid-call:
///
/// - [`Transport`](WirecallError::Transport): connection, I/O or framing
///   failure. Retrying the whole call is always safe; the runtime itself
///   never retries at this level.
/// - [`Fault`](WirecallError::Fault): the remote endpoint explicitly
///   rejected the call. Never retried automatically.
/// - [`Overload`](WirecallError::Overload): the local worker pool is at
///   capacity with no idle worker. Back off and retry later.
///
/// The remaining variants are construction-time failures (bad endpoint URL,
/// empty method name).
#[derive(Error, Debug)]
pub enum WirecallError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("fault {code}: {message}")]
    Fault { code: i32, message: String },

    #[error("too many concurrent calls ({0} workers busy)")]
    Overload(usize),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<std::io::Error> for WirecallError {
    fn from(err: std::io::Error) -> Self {
        WirecallError::Transport(err.to_string())
    }
}

impl WirecallError {
    /// Whether retrying the whole call may succeed.
    ///
    /// Transport failures and pool overload are transient; a fault reflects
    /// an application-level decision by the server and is not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WirecallError::Transport(_) | WirecallError::Overload(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, WirecallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_display() {
        let err = WirecallError::Fault {
            code: 4,
            message: "Unauthorized".to_string(),
        };
        assert_eq!(err.to_string(), "fault 4: Unauthorized");
    }

    #[test]
    fn test_io_error_folds_into_transport() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = WirecallError::from(io);
        assert!(matches!(err, WirecallError::Transport(_)));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_retryability() {
        assert!(WirecallError::Transport("broken pipe".into()).is_retryable());
        assert!(WirecallError::Overload(100).is_retryable());
        assert!(!WirecallError::Fault {
            code: 1,
            message: "no".into()
        }
        .is_retryable());
    }
}
