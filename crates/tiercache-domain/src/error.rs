//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tiercache
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or inconsistent configuration detected at startup
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid argument provided to a cache operation
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument
        message: String,
    },

    /// Remote store unreachable, timed out or answering with errors
    #[error("Backend unavailable: {message}")]
    BackendUnavailable {
        /// Description of the backend failure
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Background submission rejected because the executor queue is full
    #[error("Executor queue full: {capacity} tasks outstanding")]
    QueueFull {
        /// Configured queue capacity
        capacity: usize,
    },

    /// Background submission rejected because the executor is shutting down
    #[error("Executor is shut down")]
    ExecutorShutdown,

    /// Value encode/decode failure in the remote tier codec
    #[error("Codec error: {message}")]
    Codec {
        /// Description of the codec error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalidation bus transport error
    #[error("Invalidation bus error: {message}")]
    Bus {
        /// Description of the bus error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON parsing error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

// Basic error creation methods
impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a queue-full error
    pub fn queue_full(capacity: usize) -> Self {
        Self::QueueFull { capacity }
    }
}

// Configuration error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Backend error creation methods
impl Error {
    /// Create a backend unavailable error
    pub fn backend_unavailable<S: Into<String>>(message: S) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// Create a backend unavailable error with source
    pub fn backend_unavailable_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::BackendUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Codec and bus error creation methods
impl Error {
    /// Create a codec error
    pub fn codec<S: Into<String>>(message: S) -> Self {
        Self::Codec {
            message: message.into(),
            source: None,
        }
    }

    /// Create a codec error with source
    pub fn codec_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Codec {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a bus error
    pub fn bus<S: Into<String>>(message: S) -> Self {
        Self::Bus {
            message: message.into(),
            source: None,
        }
    }

    /// Create a bus error with source
    pub fn bus_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Bus {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

// Classification helpers used by the coordinator
impl Error {
    /// True when the remote tier could not be reached or answered with a failure.
    ///
    /// A miss is `Ok(None)`, never this error.
    pub fn is_backend_unavailable(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. })
    }

    /// True for API misuse that must be reported to the caller
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument { .. })
    }

    /// True when a background submission was rejected by backpressure
    pub fn is_queue_full(&self) -> bool {
        matches!(self, Self::QueueFull { .. })
    }
}
