//! # Infrastructure Layer
//!
//! Runtime concerns around the cache: the background executor,
//! configuration, logging and the composition root that wires providers
//! into the coordinator.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`executor`] | Bounded elastic executor and its shutdown guard |
//! | [`config`] | Figment-based layered configuration |
//! | [`logging`] | Structured logging with tracing |
//! | [`bootstrap`] | Builds a [`CacheRuntime`] from configuration |
//! | [`signals`] | SIGINT/SIGTERM handling for orderly shutdown |
//! | [`error_ext`] | Context extensions for foreign errors |
//! | [`constants`] | Deployment defaults |

pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error_ext;
pub mod executor;
pub mod logging;
pub mod signals;

// Re-export commonly used types
pub use bootstrap::{CacheRuntime, NearTierParts};
pub use config::{AppConfig, ConfigLoader};
pub use error_ext::ErrorContext;
pub use executor::{BoundedExecutor, ExecutorShutdownGuard, ShutdownReport};
pub use signals::{ShutdownSignal, ShutdownSignals};
