//! Cold, push-based streams
//!
//! An [`Observable`] is a recipe: nothing runs until `subscribe` is called,
//! and each subscription replays the recipe from the start on the calling
//! thread unless a scheduler hand-off is configured.

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use futures::{
    channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender},
    Stream, StreamExt,
};
use log::trace;

use super::{
    error::{panic_message, StreamError, StreamResult},
    observer::{CallbackObserver, Observer},
    subscriber::Subscriber,
    subscription::Subscription,
};
use crate::internal_error;

type OnSubscribe<T> = dyn Fn(Subscriber<T>) + Send + Sync;

/// A producer of zero or more ordered values terminated by completion or error
pub struct Observable<T> {
    on_subscribe: Arc<OnSubscribe<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            on_subscribe: self.on_subscribe.clone(),
        }
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Build a stream from a function that drives a [`Subscriber`].
    ///
    /// The function runs once per subscription. It should stop emitting once
    /// `is_unsubscribed` reports true.
    pub fn create<F>(on_subscribe: F) -> Self
    where
        F: Fn(Subscriber<T>) + Send + Sync + 'static,
    {
        Self {
            on_subscribe: Arc::new(on_subscribe),
        }
    }

    /// Emit one value, then complete.
    pub fn just(value: T) -> Self
    where
        T: Clone + Sync,
    {
        Self::create(move |subscriber| {
            subscriber.on_next(value.clone());
            subscriber.on_completed();
        })
    }

    /// Emit each item in order, then complete.
    pub fn from_iter<I>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Clone + Sync,
    {
        let items: Vec<T> = items.into_iter().collect();
        Self::create(move |subscriber| {
            for item in items.iter() {
                if subscriber.is_unsubscribed() {
                    return;
                }
                subscriber.on_next(item.clone());
            }
            subscriber.on_completed();
        })
    }

    /// Complete without emitting.
    pub fn empty() -> Self {
        Self::create(|subscriber| subscriber.on_completed())
    }

    /// Fail immediately with `error`.
    pub fn error(error: StreamError) -> Self {
        Self::create(move |subscriber| subscriber.on_error(error.clone()))
    }

    /// Run `callable` when subscribed, never at construction.
    ///
    /// `Ok` emits the value and completes, `Err` (or a panic) becomes the
    /// terminal error.
    pub fn from_callable<F>(callable: F) -> Self
    where
        F: Fn() -> StreamResult<T> + Send + Sync + 'static,
    {
        Self::create(move |subscriber| {
            if subscriber.is_unsubscribed() {
                return;
            }
            let result = catch_unwind(AssertUnwindSafe(&callable)).unwrap_or_else(|payload| {
                Err(internal_error!("producer panicked: {}", panic_message(payload)))
            });
            match result {
                Ok(value) => {
                    subscriber.on_next(value);
                    subscriber.on_completed();
                }
                Err(err) => subscriber.on_error(err),
            }
        })
    }

    /// Build a fresh stream for every subscriber.
    pub fn defer<F>(factory: F) -> Self
    where
        F: Fn() -> Observable<T> + Send + Sync + 'static,
    {
        Self::create(move |subscriber| factory().subscribe_subscriber(subscriber))
    }

    /// Hand an existing subscriber to this stream. Operators use this to chain.
    pub fn subscribe_subscriber(&self, subscriber: Subscriber<T>) {
        (self.on_subscribe)(subscriber)
    }

    /// Activate the pipeline and deliver its signals to `observer`.
    pub fn subscribe<O>(&self, observer: O) -> Subscription
    where
        O: Observer<T> + 'static,
    {
        let subscription = Subscription::new();
        trace!("Subscription {} activated", subscription.id());
        self.subscribe_subscriber(Subscriber::new(observer, subscription.clone()));
        subscription
    }

    /// Subscribe with one closure per callback slot.
    pub fn subscribe_with<N, E, C>(&self, on_next: N, on_error: E, on_completed: C) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
        E: FnMut(StreamError) + Send + 'static,
        C: FnMut() + Send + 'static,
    {
        self.subscribe(
            CallbackObserver::new(on_next)
                .with_error(on_error)
                .with_completed(on_completed),
        )
    }

    /// Subscribe to values only. Errors are logged and dropped.
    pub fn subscribe_next<N>(&self, on_next: N) -> Subscription
    where
        N: FnMut(T) + Send + 'static,
    {
        self.subscribe(CallbackObserver::new(on_next))
    }

    /// Bridge into an async [`Stream`] of results.
    ///
    /// The stream ends after the terminal signal. Dropping it severs the
    /// subscription.
    pub fn into_stream(self) -> ObservableStream<T> {
        let (sender, receiver) = unbounded();
        let subscription = self.subscribe(ChannelObserver { sender });
        ObservableStream {
            receiver,
            subscription,
        }
    }
}

struct ChannelObserver<T> {
    sender: UnboundedSender<StreamResult<T>>,
}

impl<T: Send> Observer<T> for ChannelObserver<T> {
    fn on_next(&mut self, value: T) {
        let _ = self.sender.unbounded_send(Ok(value));
    }

    fn on_error(&mut self, error: StreamError) {
        let _ = self.sender.unbounded_send(Err(error));
        self.sender.close_channel();
    }

    fn on_completed(&mut self) {
        self.sender.close_channel();
    }
}

/// Async view of a subscribed [`Observable`]
pub struct ObservableStream<T> {
    receiver: UnboundedReceiver<StreamResult<T>>,
    subscription: Subscription,
}

impl<T> ObservableStream<T> {
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }
}

impl<T> Stream for ObservableStream<T> {
    type Item = StreamResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl<T> Drop for ObservableStream<T> {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
