//! Bounded Background Executor
//!
//! Runs fire-and-forget cache work (asynchronous remote mutations and
//! background refreshes) on the tokio runtime without ever blocking the
//! submitter.
//!
//! ## Sizing
//!
//! | Setting | Meaning |
//! |---------|---------|
//! | `core_workers` | Workers started with the executor, alive until shutdown |
//! | `max_workers` | Upper bound; extra workers join when every worker is busy |
//! | `idle_timeout` | Extra workers retire after this long without work |
//! | `queue_capacity` | Accepted but unfinished tasks (queued + running) |
//!
//! Capacity is a semaphore: every accepted task holds one permit until it
//! finishes. A submission that finds no permit fails with `QueueFull`;
//! once the semaphore is closed it fails with `ExecutorShutdown`. A task is
//! accepted only after it is in the queue, so every `Ok` from `submit` ends
//! up either run or counted as cancelled.
//!
//! ## Shutdown
//!
//! ```text
//! shutdown(grace)
//!   ├─ close the semaphore and the queue
//!   ├─ wait up to `grace` for the workers to drain the queue
//!   └─ abort workers, drop what is left → ShutdownReport
//! ```
//!
//! [`ExecutorShutdownGuard`] ties the shutdown to a scope: `drain()` runs
//! the graceful path, dropping the guard aborts immediately.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tiercache_domain::error::{Error, Result};
use tiercache_domain::ports::{BoxTask, TaskSubmitter};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::{OwnedSemaphorePermit, Semaphore, TryAcquireError};
use tokio::task::AbortHandle;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::config::ExecutorConfig;

/// Outcome of [`BoundedExecutor::shutdown`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Every accepted task finished within the grace period
    pub completed_gracefully: bool,
    /// Tasks dropped or aborted before they finished
    pub cancelled: usize,
}

/// A queued task and the capacity permit it holds until it finishes
type Job = (BoxTask, OwnedSemaphorePermit);

struct Shared {
    config: ExecutorConfig,
    permits: Arc<Semaphore>,
    /// Taken on shutdown; workers exit once it is gone and the queue is empty
    sender: Mutex<Option<mpsc::Sender<Job>>>,
    receiver: tokio::sync::Mutex<mpsc::Receiver<Job>>,
    tracker: TaskTracker,
    aborts: Mutex<Vec<AbortHandle>>,
    workers: AtomicUsize,
    idle: AtomicUsize,
    /// Running tasks dropped by an abort
    aborted: AtomicUsize,
    runtime: Handle,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Shared {
    async fn next_job(&self) -> Option<Job> {
        self.receiver.lock().await.recv().await
    }

    /// Reserve a worker slot; false when `max_workers` are already running
    fn reserve_worker(&self) -> bool {
        self.workers
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.config.max_workers).then_some(n + 1)
            })
            .is_ok()
    }

    fn spawn_worker(self: &Arc<Self>, elastic: bool) {
        let shared = Arc::clone(self);
        let span = info_span!("executor_worker", executor = %self.config.thread_name, elastic);
        let handle = self
            .tracker
            .spawn_on(run_worker(shared, elastic).instrument(span), &self.runtime);
        let mut aborts = locked(&self.aborts);
        aborts.retain(|h| !h.is_finished());
        aborts.push(handle.abort_handle());
    }

    /// Stop intake; queued work stays in the queue for the workers
    fn close_intake(&self) {
        self.permits.close();
        drop(locked(&self.sender).take());
        self.tracker.close();
    }

    fn abort_workers(&self) {
        for handle in locked(&self.aborts).drain(..) {
            handle.abort();
        }
    }

    /// Drop every queued job; call once no worker is left
    async fn drain_queue(&self) -> usize {
        let mut receiver = self.receiver.lock().await;
        let mut dropped = 0;
        while receiver.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }

    /// Wait for the aborted workers to unwind, then count what was lost
    async fn collect_cancelled(&self) -> usize {
        self.tracker.wait().await;
        self.aborted.swap(0, Ordering::SeqCst) + self.drain_queue().await
    }
}

/// Releases the worker slot when a worker exits, retires or is aborted
struct WorkerSlot<'a>(&'a AtomicUsize);

impl Drop for WorkerSlot<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Counts the running task as cancelled unless it was marked finished
struct InFlight<'a> {
    aborted: &'a AtomicUsize,
    finished: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.aborted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

async fn run_worker(shared: Arc<Shared>, elastic: bool) {
    let _slot = WorkerSlot(&shared.workers);
    debug!("Worker started");
    loop {
        shared.idle.fetch_add(1, Ordering::SeqCst);
        let next = if elastic {
            tokio::time::timeout(shared.config.idle_timeout(), shared.next_job())
                .await
                .ok()
        } else {
            Some(shared.next_job().await)
        };
        shared.idle.fetch_sub(1, Ordering::SeqCst);

        let (task, permit) = match next {
            Some(Some(job)) => job,
            Some(None) => {
                debug!("Queue closed, worker exiting");
                return;
            }
            None => {
                debug!("Idle worker retired");
                return;
            }
        };

        let mut flight = InFlight {
            aborted: &shared.aborted,
            finished: false,
        };
        if AssertUnwindSafe(task).catch_unwind().await.is_err() {
            error!("Background task panicked");
        }
        flight.finished = true;
        drop(permit);
    }
}

/// Bounded executor on the tokio runtime
///
/// Create with [`BoundedExecutor::new`] from inside a runtime; workers are
/// spawned on that runtime.
pub struct BoundedExecutor {
    shared: Arc<Shared>,
}

impl BoundedExecutor {
    /// Start `core_workers` workers on the current runtime
    ///
    /// # Errors
    ///
    /// Returns a configuration error when called outside a tokio runtime or
    /// with inconsistent sizing.
    pub fn new(config: ExecutorConfig) -> Result<Self> {
        if config.core_workers == 0 || config.max_workers < config.core_workers {
            return Err(Error::configuration(format!(
                "Invalid executor sizing: core_workers={} max_workers={}",
                config.core_workers, config.max_workers
            )));
        }
        if config.queue_capacity == 0 {
            return Err(Error::configuration("Executor queue capacity cannot be 0"));
        }
        let runtime = Handle::try_current().map_err(|e| {
            Error::configuration_with_source("Executor must be created inside a tokio runtime", e)
        })?;

        let core_workers = config.core_workers;
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let shared = Arc::new(Shared {
            permits: Arc::new(Semaphore::new(config.queue_capacity)),
            sender: Mutex::new(Some(sender)),
            receiver: tokio::sync::Mutex::new(receiver),
            tracker: TaskTracker::new(),
            aborts: Mutex::new(Vec::with_capacity(core_workers)),
            workers: AtomicUsize::new(core_workers),
            idle: AtomicUsize::new(0),
            aborted: AtomicUsize::new(0),
            runtime,
            config,
        });
        for _ in 0..core_workers {
            shared.spawn_worker(false);
        }
        info!(
            executor = %shared.config.thread_name,
            core_workers,
            max_workers = shared.config.max_workers,
            queue_capacity = shared.config.queue_capacity,
            "Background executor started"
        );
        Ok(Self { shared })
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.shared.config
    }

    /// Workers currently alive
    pub fn worker_count(&self) -> usize {
        self.shared.workers.load(Ordering::SeqCst)
    }

    pub fn is_accepting(&self) -> bool {
        !self.shared.permits.is_closed()
    }

    /// Stop intake, wait up to `grace` for outstanding work, then abort
    pub async fn shutdown(&self, grace: Duration) -> ShutdownReport {
        let shared = &self.shared;
        shared.close_intake();
        let completed_gracefully = tokio::time::timeout(grace, shared.tracker.wait())
            .await
            .is_ok();
        if !completed_gracefully {
            shared.abort_workers();
        }
        let cancelled = shared.collect_cancelled().await;
        let report = ShutdownReport {
            completed_gracefully,
            cancelled,
        };
        if completed_gracefully {
            info!(executor = %shared.config.thread_name, "Background executor drained");
        } else {
            warn!(
                executor = %shared.config.thread_name,
                cancelled,
                grace_secs = grace.as_secs(),
                "Background executor shut down with unfinished work"
            );
        }
        report
    }

    /// Abort immediately; returns the number of unfinished tasks
    ///
    /// Aborted tasks release their capacity once the runtime drops them.
    pub fn shutdown_now(&self) -> usize {
        let unfinished = self.outstanding();
        self.shared.close_intake();
        self.shared.abort_workers();
        let shared = Arc::clone(&self.shared);
        self.shared.runtime.spawn(async move {
            shared.collect_cancelled().await;
        });
        unfinished
    }
}

impl TaskSubmitter for BoundedExecutor {
    fn submit(&self, task: BoxTask) -> Result<()> {
        let shared = &self.shared;
        let capacity = shared.config.queue_capacity;
        let permit = match Arc::clone(&shared.permits).try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) => return Err(Error::queue_full(capacity)),
            Err(TryAcquireError::Closed) => return Err(Error::ExecutorShutdown),
        };

        // shutdown takes the sender under this lock, so a worker added here
        // is always seen by its wait
        let sender = locked(&shared.sender);
        let Some(queue) = sender.as_ref() else {
            return Err(Error::ExecutorShutdown);
        };
        queue.try_send((task, permit)).map_err(|e| match e {
            TrySendError::Full(_) => Error::queue_full(capacity),
            TrySendError::Closed(_) => Error::ExecutorShutdown,
        })?;

        if shared.idle.load(Ordering::SeqCst) == 0 && shared.reserve_worker() {
            debug!(executor = %shared.config.thread_name, "All workers busy, adding a worker");
            shared.spawn_worker(true);
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.shared.config.queue_capacity
    }

    fn outstanding(&self) -> usize {
        self.capacity()
            .saturating_sub(self.shared.permits.available_permits())
    }
}

impl std::fmt::Debug for BoundedExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedExecutor")
            .field("name", &self.shared.config.thread_name)
            .field("workers", &self.worker_count())
            .field("outstanding", &self.outstanding())
            .field("capacity", &self.capacity())
            .field("accepting", &self.is_accepting())
            .finish()
    }
}

/// Scoped release of a [`BoundedExecutor`]
///
/// Call [`drain`](Self::drain) on orderly shutdown. Dropping an undrained
/// guard aborts outstanding work and logs how much was lost.
#[derive(Debug)]
pub struct ExecutorShutdownGuard {
    executor: Option<Arc<BoundedExecutor>>,
    grace: Duration,
}

impl ExecutorShutdownGuard {
    pub fn new(executor: Arc<BoundedExecutor>, grace: Duration) -> Self {
        Self {
            executor: Some(executor),
            grace,
        }
    }

    pub fn executor(&self) -> Option<&Arc<BoundedExecutor>> {
        self.executor.as_ref()
    }

    /// Graceful shutdown with the configured grace period
    pub async fn drain(mut self) -> ShutdownReport {
        match self.executor.take() {
            Some(executor) => executor.shutdown(self.grace).await,
            None => ShutdownReport {
                completed_gracefully: true,
                cancelled: 0,
            },
        }
    }
}

impl Drop for ExecutorShutdownGuard {
    fn drop(&mut self) {
        if let Some(executor) = self.executor.take() {
            let cancelled = executor.shutdown_now();
            if cancelled > 0 {
                warn!(cancelled, "Executor released without draining, work cancelled");
            } else {
                debug!("Executor released without draining");
            }
        }
    }
}
