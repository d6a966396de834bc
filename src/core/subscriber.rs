//! Emission guard between a producer and its observer
//!
//! A [`Subscriber`] enforces the stream grammar `Next* (Error | Completed)?`:
//! nothing is delivered after a terminal signal or after the subscription is
//! severed, and a terminal signal severs the subscription it belongs to.

use std::sync::{Arc, Mutex};

use super::{
    error::StreamError,
    lock,
    observer::{Notification, Observer},
    subscription::Subscription,
};

struct SubscriberState<T> {
    observer: Box<dyn Observer<T>>,
    terminated: bool,
}

/// Producer-facing handle used to push signals downstream
///
/// Clones share the same observer, so a subscriber may be handed to several
/// threads; deliveries are serialized.
pub struct Subscriber<T> {
    state: Arc<Mutex<SubscriberState<T>>>,
    subscription: Subscription,
}

impl<T> Clone for Subscriber<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            subscription: self.subscription.clone(),
        }
    }
}

impl<T> Subscriber<T> {
    pub fn new<O>(observer: O, subscription: Subscription) -> Self
    where
        O: Observer<T> + 'static,
    {
        Self {
            state: Arc::new(Mutex::new(SubscriberState {
                observer: Box::new(observer),
                terminated: false,
            })),
            subscription,
        }
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    /// Producers should poll this between emissions and stop early.
    pub fn is_unsubscribed(&self) -> bool {
        self.subscription.is_unsubscribed()
    }

    pub fn on_next(&self, value: T) {
        if self.is_unsubscribed() {
            return;
        }
        let mut state = lock(&self.state);
        if state.terminated || self.is_unsubscribed() {
            return;
        }
        state.observer.on_next(value);
    }

    pub fn on_error(&self, error: StreamError) {
        self.terminate(Notification::Error(error));
    }

    pub fn on_completed(&self) {
        self.terminate(Notification::Completed);
    }

    pub fn notify(&self, notification: Notification<T>) {
        match notification {
            Notification::Next(value) => self.on_next(value),
            terminal => self.terminate(terminal),
        }
    }

    fn terminate(&self, notification: Notification<T>) {
        if self.is_unsubscribed() {
            return;
        }
        {
            let mut state = lock(&self.state);
            if state.terminated || self.is_unsubscribed() {
                return;
            }
            state.terminated = true;
            notification.accept(state.observer.as_mut());
        }
        self.subscription.unsubscribe();
    }
}
