//! Core reactive-stream abstractions for rxscreen
//!
//! This module provides the stream type, its operators, the observer and
//! subscription handles, and the unified error type that every other module
//! builds on.

pub mod error;
pub mod observable;
pub mod observer;
pub mod operators;
pub mod subscriber;
pub mod subscription;
pub mod zip;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::{Mutex, MutexGuard, PoisonError};

// Re-export commonly used types
pub use error::{ErrorContext, StreamError, StreamResult};
pub use observable::{Observable, ObservableStream};
pub use observer::{CallbackObserver, Notification, Observer};
pub use subscriber::Subscriber;
pub use subscription::Subscription;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
