//! Observer callbacks
//!
//! An [`Observer`] receives the three kinds of signal a stream produces.
//! Closures are the usual way to build one, see [`CallbackObserver`].

use log::warn;

use super::error::StreamError;

/// A single signal travelling from a producer to its consumer
#[derive(Debug, Clone)]
pub enum Notification<T> {
    Next(T),
    Error(StreamError),
    Completed,
}

impl<T> Notification<T> {
    /// Whether this signal ends the stream
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Notification::Next(_))
    }

    /// Deliver this signal to an observer
    pub fn accept<O>(self, observer: &mut O)
    where
        O: Observer<T> + ?Sized,
    {
        match self {
            Notification::Next(value) => observer.on_next(value),
            Notification::Error(err) => observer.on_error(err),
            Notification::Completed => observer.on_completed(),
        }
    }
}

/// Consumer side of a stream
///
/// `on_error` and `on_completed` are terminal: at most one of them is called,
/// and never more than once.
pub trait Observer<T>: Send {
    /// Called for each emitted value
    fn on_next(&mut self, value: T);

    /// Called when the stream fails
    fn on_error(&mut self, error: StreamError);

    /// Called when the stream has no more data to emit
    fn on_completed(&mut self);
}

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnMut(StreamError) + Send>;
type CompletedFn = Box<dyn FnMut() + Send>;

/// Observer assembled from closures, one per callback slot
pub struct CallbackObserver<T> {
    on_next: NextFn<T>,
    on_error: Option<ErrorFn>,
    on_completed: Option<CompletedFn>,
}

impl<T> CallbackObserver<T> {
    /// Observer that only handles values; errors are logged and dropped
    pub fn new<N>(on_next: N) -> Self
    where
        N: FnMut(T) + Send + 'static,
    {
        Self {
            on_next: Box::new(on_next),
            on_error: None,
            on_completed: None,
        }
    }

    pub fn with_error<E>(mut self, on_error: E) -> Self
    where
        E: FnMut(StreamError) + Send + 'static,
    {
        self.on_error = Some(Box::new(on_error));
        self
    }

    pub fn with_completed<C>(mut self, on_completed: C) -> Self
    where
        C: FnMut() + Send + 'static,
    {
        self.on_completed = Some(Box::new(on_completed));
        self
    }
}

impl<T> Observer<T> for CallbackObserver<T> {
    fn on_next(&mut self, value: T) {
        (self.on_next)(value)
    }

    fn on_error(&mut self, error: StreamError) {
        match self.on_error.as_mut() {
            Some(on_error) => on_error(error),
            None => warn!("Unhandled stream error dropped: {error}"),
        }
    }

    fn on_completed(&mut self) {
        if let Some(on_completed) = self.on_completed.as_mut() {
            on_completed()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_callback_slots_are_routed() {
        let log = Arc::new(Mutex::new(Vec::new()));

        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());
        let mut observer =
            CallbackObserver::new(move |v: i32| l1.lock().unwrap().push(format!("next {v}")))
                .with_error(move |e| l2.lock().unwrap().push(format!("error {e}")))
                .with_completed(move || l3.lock().unwrap().push("completed".to_string()));

        observer.on_next(7);
        observer.on_error(StreamError::Internal("boom".to_string()));
        observer.on_completed();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["next 7", "error Internal error: boom", "completed"]
        );
    }

    #[test]
    fn test_missing_error_slot_does_not_panic() {
        let mut observer = CallbackObserver::new(|_: i32| {});
        observer.on_error(StreamError::Transform("ignored".to_string()));
        observer.on_completed();
    }

    #[test]
    fn test_notification_accept() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut observer =
            CallbackObserver::new(move |v: &'static str| sink.lock().unwrap().push(v));

        let next = Notification::Next("x");
        assert!(!next.is_terminal());
        next.accept(&mut observer);
        assert!(Notification::<&str>::Completed.is_terminal());

        assert_eq!(*seen.lock().unwrap(), vec!["x"]);
    }
}
