use crate::transport::TransportKind;

/// Client runtime configuration.
///
/// # Default Configuration
///
/// - `max_workers`: 100 concurrent workers before `Overload`
/// - `max_idle_workers`: 20 workers kept around between calls
/// - `keep_alive`: true (the keep-alive transport asks for and honors
///   persistent connections)
/// - `transport`: [`TransportKind::Pooled`]
///
/// # Example
///
/// ```rust
/// use wirecall_client::{ClientConfig, TransportKind};
///
/// let config = ClientConfig {
///     max_workers: 16,
///     transport: TransportKind::KeepAlive,
///     ..ClientConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Maximum number of concurrently busy workers; exceeding it fails fast
    /// with `Overload` rather than blocking.
    pub max_workers: usize,
    /// Cap on the idle worker stack; workers released beyond it are dropped.
    pub max_idle_workers: usize,
    /// Whether connection reuse across calls is desired at all. Only
    /// consulted by the keep-alive transport.
    pub keep_alive: bool,
    /// Which transport implementation workers are built with.
    pub transport: TransportKind,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_workers: 100,
            max_idle_workers: 20,
            keep_alive: true,
            transport: TransportKind::Pooled,
        }
    }
}
