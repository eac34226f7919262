//! Process Termination Signals
//!
//! The node stops on SIGINT (Ctrl-C) and, on Unix, on SIGTERM as sent by
//! service managers and container runtimes. Handlers are installed up
//! front so a signal arriving before [`ShutdownSignals::recv`] is polled
//! is still delivered.

use crate::error_ext::ErrorContext;
use std::fmt;
use tiercache_domain::error::Result;
#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};

/// Signal that asked the process to stop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
        }
    }
}

/// Installed shutdown signal handlers
#[derive(Debug)]
pub struct ShutdownSignals {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
}

impl ShutdownSignals {
    /// Install the handlers; must run inside a tokio runtime
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())
                .config_context("Failed to install SIGINT handler")?,
            terminate: signal(SignalKind::terminate())
                .config_context("Failed to install SIGTERM handler")?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> Result<Self> {
        Ok(Self {})
    }

    /// Wait for the first shutdown signal
    #[cfg(unix)]
    pub async fn recv(&mut self) -> Result<ShutdownSignal> {
        tokio::select! {
            _ = self.interrupt.recv() => Ok(ShutdownSignal::Interrupt),
            _ = self.terminate.recv() => Ok(ShutdownSignal::Terminate),
        }
    }

    #[cfg(not(unix))]
    pub async fn recv(&mut self) -> Result<ShutdownSignal> {
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        Ok(ShutdownSignal::Interrupt)
    }
}
