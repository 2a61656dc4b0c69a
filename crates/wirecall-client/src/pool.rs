//! Worker Pool
//!
//! A bounded collection of reusable workers. `acquire` pops an idle worker
//! or constructs a new one while the busy count is below the configured
//! maximum; past that it fails fast with `Overload` instead of blocking.
//! `release` decrements the busy count unconditionally and pools the worker
//! only when it is healthy: a worker that ended its last call in a fault
//! state is dropped, because its connection's framing state is unknown.
//!
//! All counter and stack manipulation happens under one coarse lock, held
//! only for O(1) bookkeeping and never across network I/O.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use wirecall_common::{Result, WirecallError};

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::transport::TransportFactory;
use crate::worker::Worker;

/// Shared exponentially-weighted moving average of call round-trip time,
/// weighted 4:1 old:new.
///
/// Owned by the pool and handed to each worker; updated under a small lock,
/// read lock-free. This is a scheduling heuristic only; a stale read is
/// tolerable and correctness never depends on it.
pub struct RoundTripEstimate {
    micros: AtomicU64,
    update: Mutex<()>,
}

impl RoundTripEstimate {
    pub(crate) fn new() -> Self {
        Self {
            micros: AtomicU64::new(0),
            update: Mutex::new(()),
        }
    }

    pub(crate) fn record(&self, sample: Duration) {
        let sample = u64::try_from(sample.as_micros()).unwrap_or(u64::MAX);
        let _guard = self.update.lock().unwrap_or_else(PoisonError::into_inner);
        let old = self.micros.load(Ordering::Relaxed);
        let next = (old.saturating_mul(4).saturating_add(sample)) / 5;
        self.micros.store(next, Ordering::Relaxed);
    }

    /// Current estimate. Zero until the first call completes.
    pub fn current(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::Relaxed))
    }
}

struct PoolInner {
    idle: Vec<Worker>,
    busy: usize,
}

pub(crate) struct WorkerPool {
    inner: Mutex<PoolInner>,
    max_workers: usize,
    max_idle: usize,
    endpoint: Endpoint,
    factory: TransportFactory,
    round_trip: Arc<RoundTripEstimate>,
}

impl WorkerPool {
    pub(crate) fn new(endpoint: Endpoint, factory: TransportFactory, config: &ClientConfig) -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                idle: Vec::new(),
                busy: 0,
            }),
            max_workers: config.max_workers,
            max_idle: config.max_idle_workers,
            endpoint,
            factory,
            round_trip: Arc::new(RoundTripEstimate::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PoolInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands out an idle worker, or constructs one while under capacity.
    ///
    /// The capacity check and the busy increment are atomic with respect to
    /// concurrent acquires: `max_workers + 1` simultaneous calls yield
    /// exactly one `Overload`.
    pub(crate) fn acquire(&self) -> Result<Worker> {
        let mut inner = self.lock();
        if let Some(worker) = inner.idle.pop() {
            inner.busy += 1;
            return Ok(worker);
        }
        if inner.busy >= self.max_workers {
            return Err(WirecallError::Overload(inner.busy));
        }
        inner.busy += 1;
        drop(inner);

        // Construction is cheap: transports connect lazily on first use.
        Ok(Worker::new(
            self.factory.create(&self.endpoint),
            Arc::clone(&self.round_trip),
        ))
    }

    /// Returns a worker after a call.
    ///
    /// The busy count drops unconditionally. The worker is pooled only if
    /// the caller saw a healthy finish, the worker itself is not faulted,
    /// and the idle stack has room; otherwise it is dropped along with its
    /// connection.
    pub(crate) fn release(&self, worker: Worker, healthy: bool) {
        let mut inner = self.lock();
        inner.busy = inner.busy.saturating_sub(1);
        if healthy && !worker.is_faulted() && inner.idle.len() < self.max_idle {
            inner.idle.push(worker);
        } else {
            tracing::debug!(faulted = worker.is_faulted(), "discarding worker");
        }
    }

    pub(crate) fn busy(&self) -> usize {
        self.lock().busy
    }

    #[cfg(test)]
    pub(crate) fn idle(&self) -> usize {
        self.lock().idle.len()
    }

    pub(crate) fn round_trip(&self) -> &Arc<RoundTripEstimate> {
        &self.round_trip
    }
}
