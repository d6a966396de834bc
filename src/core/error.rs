//! Unified error handling for rxscreen
//!
//! Every failure inside a pipeline is converted into a [`StreamError`] and
//! delivered as a terminal signal, so modules never need to depend on each
//! other's error types.

use std::{fmt, sync::Arc};

/// Unified error types for the stream system
#[derive(Debug, Clone)]
pub enum StreamError {
    /// A map/filter function failed or panicked
    Transform(String),

    /// Network and I/O errors
    Io(Arc<std::io::Error>),

    /// HTTP client errors (connect, status, body decoding)
    Http(Arc<reqwest::Error>),

    /// Configuration-related errors
    Configuration(String),

    /// Lifecycle misuse, e.g. creating a screen twice
    Lifecycle(String),

    /// View or resource lookup failures
    NotFound(String),

    /// A scheduler could not accept work
    Scheduler(String),

    /// Internal system errors
    Internal(String),
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamError::Transform(msg) => write!(f, "Transform error: {msg}"),
            StreamError::Io(err) => write!(f, "I/O error: {err}"),
            StreamError::Http(err) => write!(f, "HTTP error: {err}"),
            StreamError::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            StreamError::Lifecycle(msg) => write!(f, "Lifecycle error: {msg}"),
            StreamError::NotFound(msg) => write!(f, "Resource not found: {msg}"),
            StreamError::Scheduler(msg) => write!(f, "Scheduler error: {msg}"),
            StreamError::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for StreamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StreamError::Io(err) => Some(err.as_ref()),
            StreamError::Http(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StreamError {
    fn from(err: std::io::Error) -> Self {
        StreamError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Http(Arc::new(err))
    }
}

impl StreamError {
    /// Whether this error came from the network layer
    pub fn is_io(&self) -> bool {
        matches!(self, StreamError::Io(_) | StreamError::Http(_))
    }
}

/// Result type alias for stream operations
pub type StreamResult<T> = std::result::Result<T, StreamError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    fn with_context(self, context: &str) -> StreamResult<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: fmt::Display,
{
    fn with_context(self, context: &str) -> StreamResult<T> {
        self.map_err(|e| StreamError::Internal(format!("{context}: {e}")))
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::StreamError::Configuration($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::StreamError::Configuration(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! transform_error {
    ($msg:expr) => {
        $crate::core::StreamError::Transform($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::StreamError::Transform(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::core::StreamError::Internal($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::StreamError::Internal(format!($fmt, $($arg)*))
    };
}

/// Render a caught panic payload as a message.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panicked with a non-string payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_prefixes_message() {
        let result: Result<(), &str> = Err("disk full");
        match result.with_context("Saving state") {
            Err(StreamError::Internal(msg)) => assert_eq!("Saving state: disk full", msg),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(Ok::<_, &str>(3).with_context("unused").unwrap(), 3);
    }

    #[test]
    fn test_error_macros() {
        let err = crate::transform_error!("bad value {}", 7);
        assert!(matches!(&err, StreamError::Transform(msg) if msg == "bad value 7"));
        assert_eq!("Transform error: bad value 7", err.to_string());

        let err = crate::internal_error!("boom");
        assert!(matches!(err, StreamError::Internal(msg) if msg == "boom"));
    }

    #[test]
    fn test_panic_message_payloads() {
        assert_eq!("static", panic_message(Box::new("static")));
        assert_eq!("owned", panic_message(Box::new("owned".to_string())));
        assert_eq!(
            "panicked with a non-string payload",
            panic_message(Box::new(42_u8))
        );
    }
}
