//! Background Execution Port
//!
//! Fire-and-forget work (asynchronous remote writes, background refreshes)
//! goes through a bounded executor. Submission never blocks: it either
//! accepts the task or fails immediately.

use crate::error::Result;
use futures::future::BoxFuture;

/// Unit of background work
pub type BoxTask = BoxFuture<'static, ()>;

/// Bounded executor port
pub trait TaskSubmitter: Send + Sync + std::fmt::Debug {
    /// Hand `task` to the executor
    ///
    /// Fails with [`Error::QueueFull`](crate::Error::QueueFull) when the
    /// executor already holds its capacity of unfinished tasks, and with
    /// [`Error::ExecutorShutdown`](crate::Error::ExecutorShutdown) once
    /// shutdown has begun. A rejected task is dropped without running.
    fn submit(&self, task: BoxTask) -> Result<()>;

    /// Maximum number of unfinished tasks
    fn capacity(&self) -> usize;

    /// Tasks accepted but not yet finished
    fn outstanding(&self) -> usize;
}
