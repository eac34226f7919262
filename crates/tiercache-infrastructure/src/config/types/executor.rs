//! Executor configuration types

use crate::constants::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Background executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Workers started with the executor
    pub core_workers: usize,

    /// Upper bound on workers, elastic ones included
    pub max_workers: usize,

    /// Accepted but unfinished tasks before submissions are rejected
    pub queue_capacity: usize,

    /// Elastic workers retire after this many idle seconds
    pub idle_timeout_secs: u64,

    /// Seconds granted to outstanding work on shutdown
    pub shutdown_grace_secs: u64,

    /// Name used in executor log records
    pub thread_name: String,
}

impl ExecutorConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            core_workers: EXECUTOR_DEFAULT_CORE_WORKERS,
            max_workers: EXECUTOR_DEFAULT_MAX_WORKERS,
            queue_capacity: EXECUTOR_DEFAULT_QUEUE_CAPACITY,
            idle_timeout_secs: EXECUTOR_DEFAULT_IDLE_TIMEOUT_SECS,
            shutdown_grace_secs: EXECUTOR_DEFAULT_SHUTDOWN_GRACE_SECS,
            thread_name: EXECUTOR_DEFAULT_NAME.to_string(),
        }
    }
}
