//! # tiercache application layer
//!
//! Composes the ports from `tiercache-domain` into the two-tier cache
//! protocols.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`coordinator`] | Read-through, write-through and invalidate-broadcast over both tiers |
//! | [`listener`] | Receive side of the invalidation bus |
//! | [`interceptor`] | Wraps business calls with cacheable / put / evict behaviour |
//!
//! ## Dependencies
//!
//! This crate depends only on `tiercache-domain` and pure Rust libraries.
//! Redis, Moka and the buses are injected by `tiercache-infrastructure`.

pub mod coordinator;
pub mod interceptor;
pub mod listener;

pub use coordinator::{CacheCoordinator, CacheCoordinatorBuilder, WriteMode};
pub use interceptor::{CacheEvict, CacheInterceptor, CachePut, Cacheable};
pub use listener::InvalidationListener;
