//! Per-value transform stages: map, skip, filter and a logging tap.
//!
//! Each operator subscribes upstream with a child of the downstream
//! subscription, so severing downstream stops the source and a failing
//! transform severs upstream.

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

use super::{
    error::{panic_message, StreamError, StreamResult},
    observable::Observable,
    observer::Observer,
    subscriber::Subscriber,
};
use crate::transform_error;

/// Run a user function, turning a panic into a transform error.
fn guarded<R>(f: impl FnOnce() -> StreamResult<R>) -> StreamResult<R> {
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(transform_error!(panic_message(payload))))
}

struct MapObserver<T, U> {
    transform: Arc<dyn Fn(T) -> StreamResult<U> + Send + Sync>,
    downstream: Subscriber<U>,
}

impl<T, U> Observer<T> for MapObserver<T, U>
where
    T: Send,
    U: Send,
{
    fn on_next(&mut self, value: T) {
        match guarded(|| (self.transform)(value)) {
            Ok(mapped) => self.downstream.on_next(mapped),
            Err(err) => self.downstream.on_error(err),
        }
    }

    fn on_error(&mut self, error: StreamError) {
        self.downstream.on_error(error);
    }

    fn on_completed(&mut self) {
        self.downstream.on_completed();
    }
}

struct SkipObserver<T> {
    remaining: usize,
    downstream: Subscriber<T>,
}

impl<T: Send> Observer<T> for SkipObserver<T> {
    fn on_next(&mut self, value: T) {
        if self.remaining > 0 {
            self.remaining -= 1;
            return;
        }
        self.downstream.on_next(value);
    }

    fn on_error(&mut self, error: StreamError) {
        self.downstream.on_error(error);
    }

    fn on_completed(&mut self) {
        self.downstream.on_completed();
    }
}

struct FilterObserver<T> {
    predicate: Arc<dyn Fn(&T) -> StreamResult<bool> + Send + Sync>,
    downstream: Subscriber<T>,
}

impl<T: Send> Observer<T> for FilterObserver<T> {
    fn on_next(&mut self, value: T) {
        match guarded(|| (self.predicate)(&value)) {
            Ok(true) => self.downstream.on_next(value),
            Ok(false) => {}
            Err(err) => self.downstream.on_error(err),
        }
    }

    fn on_error(&mut self, error: StreamError) {
        self.downstream.on_error(error);
    }

    fn on_completed(&mut self) {
        self.downstream.on_completed();
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Emit `f(v)` for each upstream value.
    pub fn map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        self.try_map(move |value| Ok(f(value)))
    }

    /// Like [`map`](Self::map), but `f` may fail; the first failure ends the
    /// stream with that error.
    pub fn try_map<U, F>(&self, f: F) -> Observable<U>
    where
        U: Send + 'static,
        F: Fn(T) -> StreamResult<U> + Send + Sync + 'static,
    {
        let source = self.clone();
        let transform: Arc<dyn Fn(T) -> StreamResult<U> + Send + Sync> = Arc::new(f);
        Observable::create(move |downstream: Subscriber<U>| {
            let upstream = downstream.subscription().child();
            source.subscribe_subscriber(Subscriber::new(
                MapObserver {
                    transform: transform.clone(),
                    downstream,
                },
                upstream,
            ));
        })
    }

    /// Drop the first `count` values.
    pub fn skip(&self, count: usize) -> Observable<T> {
        let source = self.clone();
        Observable::create(move |downstream: Subscriber<T>| {
            let upstream = downstream.subscription().child();
            source.subscribe_subscriber(Subscriber::new(
                SkipObserver {
                    remaining: count,
                    downstream,
                },
                upstream,
            ));
        })
    }

    /// Pass through only values matching `predicate`.
    pub fn filter<P>(&self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.try_filter(move |value| Ok(predicate(value)))
    }

    /// Like [`filter`](Self::filter) with a fallible predicate.
    pub fn try_filter<P>(&self, predicate: P) -> Observable<T>
    where
        P: Fn(&T) -> StreamResult<bool> + Send + Sync + 'static,
    {
        let source = self.clone();
        let predicate: Arc<dyn Fn(&T) -> StreamResult<bool> + Send + Sync> = Arc::new(predicate);
        Observable::create(move |downstream: Subscriber<T>| {
            let upstream = downstream.subscription().child();
            source.subscribe_subscriber(Subscriber::new(
                FilterObserver {
                    predicate: predicate.clone(),
                    downstream,
                },
                upstream,
            ));
        })
    }

    /// Observe each value without changing it. Used for tagged logging.
    pub fn do_on_next<F>(&self, f: F) -> Observable<T>
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.filter(move |value| {
            f(value);
            true
        })
    }
}
