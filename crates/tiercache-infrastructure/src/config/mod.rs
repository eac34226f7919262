//! Configuration management
//!
//! Layered configuration: built-in defaults, then a TOML file, then
//! `TIERCACHE_` environment variables (`__` separates nested keys, e.g.
//! `TIERCACHE_REDIS__HOST`).

pub mod loader;
pub mod types;

pub use loader::ConfigLoader;
pub use types::*;
