//! Error extension utilities
//!
//! Context extension methods converting foreign errors into the domain
//! error type.

use std::fmt;
use tiercache_domain::error::{Error, Result};

/// Extension trait for adding context to errors
///
/// # Example
///
/// ```ignore
/// use tiercache_infrastructure::error_ext::ErrorContext;
///
/// let raw = std::fs::read_to_string(&path)
///     .config_context(format!("Failed to read config file: {}", path.display()))?;
///
/// let conn = client.get_connection().backend_context("Redis unreachable")?;
/// ```
pub trait ErrorContext<T> {
    /// Add context to a Result, converting the error to an internal error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Add context with lazy evaluation for expensive context creation
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;

    /// Add context for configuration operations
    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        Self: Sized;

    /// Add context for remote backend operations
    fn backend_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        Self: Sized;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|err| Error::Internal {
            message: format!("{context}: {err}"),
        })
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|err| Error::Internal {
            message: format!("{}: {}", f(), err),
        })
    }

    fn config_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        Self: Sized,
    {
        self.map_err(|err| Error::Configuration {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }

    fn backend_context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
        Self: Sized,
    {
        self.map_err(|err| Error::BackendUnavailable {
            message: format!("{context}: {err}"),
            source: Some(Box::new(err)),
        })
    }
}
