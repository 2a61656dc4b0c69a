//! Client Facade
//!
//! The single entry point: [`Client::execute`] runs a call synchronously on
//! the caller's thread; [`Client::execute_async`] runs it on a worker
//! thread or parks it in the call queue when enough workers are already
//! busy. Scheduling decisions and queue access share one dispatch lock, so
//! a queued call can never be stranded between a queue check and a worker
//! release.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use wirecall_common::codec::Codec;
use wirecall_common::{Call, Result, RpcValue, WirecallError};

use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::pool::WorkerPool;
use crate::queue::{CallQueue, QueuedCall};
use crate::transport::{TransportFactory, TransportKind, USER_AGENT};
use crate::worker::Worker;

/// Below this many busy workers, an asynchronous call is dispatched on a
/// fresh thread immediately; at or above it, the call is queued for
/// whichever worker next becomes free. Inherited as-is from the original
/// dispatch policy.
pub const DIRECT_DISPATCH_LIMIT: usize = 2;

/// Completion callback for [`Client::execute_async`].
///
/// Exactly one of the two methods is invoked, exactly once per submitted
/// call. The error branch also receives the endpoint URL and method name,
/// since the callback has no other way to know which call failed.
pub trait AsyncCallback: Send {
    fn handle_result(self: Box<Self>, result: RpcValue);
    fn handle_error(self: Box<Self>, error: WirecallError, url: &str, method: &str);
}

/// XML-RPC client for a single endpoint.
///
/// Cloning is cheap and shares the worker pool, call queue and round-trip
/// estimate.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    endpoint: Endpoint,
    codec: Arc<dyn Codec>,
    pool: WorkerPool,
    dispatch: Mutex<CallQueue>,
}

impl Client {
    /// Creates a client with the default configuration.
    pub fn new(url: &str, codec: Arc<dyn Codec>) -> Result<Self> {
        Self::with_config(url, codec, ClientConfig::default())
    }

    pub fn with_config(url: &str, codec: Arc<dyn Codec>, config: ClientConfig) -> Result<Self> {
        Self::with_endpoint(Endpoint::parse(url)?, codec, config)
    }

    pub fn with_endpoint(
        endpoint: Endpoint,
        codec: Arc<dyn Codec>,
        config: ClientConfig,
    ) -> Result<Self> {
        let factory = match config.transport {
            TransportKind::Pooled => {
                let client = reqwest::blocking::Client::builder()
                    .user_agent(USER_AGENT)
                    .build()
                    .map_err(|e| {
                        WirecallError::Transport(format!("building HTTP client: {}", e))
                    })?;
                TransportFactory::Pooled { client }
            }
            TransportKind::KeepAlive => TransportFactory::KeepAlive {
                keep_alive: config.keep_alive,
            },
        };
        let pool = WorkerPool::new(endpoint.clone(), factory, &config);
        Ok(Client {
            inner: Arc::new(ClientInner {
                endpoint,
                codec,
                pool,
                dispatch: Mutex::new(CallQueue::default()),
            }),
        })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.inner.endpoint
    }

    /// Current round-trip estimate across all workers. Zero until the
    /// first call completes.
    pub fn round_trip_estimate(&self) -> Duration {
        self.inner.pool.round_trip().current()
    }

    /// Runs a call synchronously, blocking the calling thread for the
    /// duration of connect/write/read.
    ///
    /// The worker is always given back, healthy or not, so error paths
    /// never leak pool capacity.
    ///
    /// # Errors
    ///
    /// - [`WirecallError::Transport`] if the connection could not be made
    ///   or the response could not be fetched/parsed
    /// - [`WirecallError::Fault`] if the remote end returned a fault
    ///   envelope
    /// - [`WirecallError::Overload`] if the pool cannot grow and has no
    ///   idle worker
    pub fn execute(&self, method: &str, params: Vec<RpcValue>) -> Result<RpcValue> {
        let call = Call::new(method, params)?;
        let mut worker = self.inner.pool.acquire()?;
        let result = worker.execute(&call, self.inner.codec.as_ref());
        self.inner.finish_worker(worker);
        result
    }

    /// Submits a call asynchronously. Never blocks on the pool.
    ///
    /// With fewer than [`DIRECT_DISPATCH_LIMIT`] busy workers the call runs
    /// on a freshly spawned thread; otherwise (or when no worker can be
    /// acquired) it joins the call queue. The callback, if present, is
    /// invoked exactly once with either the result or the error.
    pub fn execute_async(
        &self,
        method: &str,
        params: Vec<RpcValue>,
        callback: Option<Box<dyn AsyncCallback>>,
    ) {
        let call = match Call::new(method, params) {
            Ok(call) => call,
            Err(err) => {
                if let Some(callback) = callback {
                    callback.handle_error(err, &self.inner.endpoint.url(), method);
                }
                return;
            }
        };
        let queued = QueuedCall { call, callback };

        let mut queue = self.inner.lock_dispatch();
        if self.inner.pool.busy() < DIRECT_DISPATCH_LIMIT {
            match self.inner.pool.acquire() {
                Ok(worker) => {
                    drop(queue);
                    self.inner.spawn_worker_thread(worker, queued);
                    return;
                }
                Err(err) => {
                    tracing::debug!(error = %err, "no worker available, queueing call");
                }
            }
        }
        queue.push(queued);
        tracing::debug!(depth = queue.len(), "call queued");
    }
}

impl ClientInner {
    fn lock_dispatch(&self) -> MutexGuard<'_, CallQueue> {
        self.dispatch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a worker after a synchronous call. A healthy worker picks
    /// up a queued asynchronous call before going back to the pool; a
    /// faulted one is discarded, and draining restarts on a fresh worker
    /// if calls are waiting.
    fn finish_worker(self: &Arc<Self>, worker: Worker) {
        let healthy = !worker.is_faulted();
        let mut queue = self.lock_dispatch();
        if healthy {
            if let Some(next) = queue.pop() {
                drop(queue);
                self.spawn_worker_thread(worker, next);
                return;
            }
            self.pool.release(worker, true);
            return;
        }

        self.pool.release(worker, false);
        if !queue.is_empty() {
            if let Ok(fresh) = self.pool.acquire() {
                if let Some(next) = queue.pop() {
                    drop(queue);
                    self.spawn_worker_thread(fresh, next);
                } else {
                    self.pool.release(fresh, true);
                }
            }
        }
    }

    fn spawn_worker_thread(self: &Arc<Self>, worker: Worker, first: QueuedCall) {
        let inner = Arc::clone(self);
        thread::spawn(move || inner.drain(worker, first));
    }

    /// Runs asynchronous calls until the queue is empty, then gives the
    /// worker back. The queue check and the release are atomic under the
    /// dispatch lock, so a concurrent submit either sees a busy worker or
    /// finds the pool capacity this worker just freed.
    fn drain(self: Arc<Self>, mut worker: Worker, first: QueuedCall) {
        let mut queued = first;
        loop {
            let result = worker.execute(&queued.call, self.codec.as_ref());
            if let Some(callback) = queued.callback.take() {
                match result {
                    Ok(value) => callback.handle_result(value),
                    Err(err) => {
                        callback.handle_error(err, &self.endpoint.url(), &queued.call.method)
                    }
                }
            }

            let mut queue = self.lock_dispatch();
            match queue.pop() {
                Some(next) => {
                    if worker.is_faulted() {
                        // Swap the dead worker for a fresh one; if the pool
                        // is exhausted, put the call back for whichever
                        // worker frees up next.
                        self.pool.release(worker, false);
                        match self.pool.acquire() {
                            Ok(fresh) => worker = fresh,
                            Err(_) => {
                                queue.push_front(next);
                                return;
                            }
                        }
                    }
                    drop(queue);
                    queued = next;
                }
                None => {
                    let healthy = !worker.is_faulted();
                    self.pool.release(worker, healthy);
                    return;
                }
            }
        }
    }
}
