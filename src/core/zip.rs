//! Pairwise combination of two streams.

use std::{
    collections::VecDeque,
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex},
};

use super::{
    error::{panic_message, StreamError},
    lock,
    observable::Observable,
    observer::Observer,
    subscriber::Subscriber,
};
use crate::transform_error;

struct ZipState<A, B> {
    left: VecDeque<A>,
    right: VecDeque<B>,
    left_done: bool,
    right_done: bool,
    terminated: bool,
}

impl<A, B> ZipState<A, B> {
    /// No further pair can form once a finished side has run dry.
    fn exhausted(&self) -> bool {
        (self.left_done && self.left.is_empty()) || (self.right_done && self.right.is_empty())
    }
}

struct ZipCoordinator<A, B, T> {
    state: Mutex<ZipState<A, B>>,
    combiner: Arc<dyn Fn(A, B) -> T + Send + Sync>,
    downstream: Subscriber<T>,
}

impl<A, B, T> ZipCoordinator<A, B, T> {
    /// Emit every complete pair, then complete if exhausted.
    ///
    /// Runs with the state lock held so pairs leave in index order even when
    /// the two sides emit from different threads.
    fn drain(&self, state: &mut ZipState<A, B>) {
        while !state.terminated && !state.left.is_empty() && !state.right.is_empty() {
            let (Some(a), Some(b)) = (state.left.pop_front(), state.right.pop_front()) else {
                break;
            };
            match catch_unwind(AssertUnwindSafe(|| (self.combiner)(a, b))) {
                Ok(combined) => self.downstream.on_next(combined),
                Err(payload) => {
                    state.terminated = true;
                    self.downstream
                        .on_error(transform_error!(panic_message(payload)));
                    return;
                }
            }
        }
        if !state.terminated && state.exhausted() {
            state.terminated = true;
            state.left.clear();
            state.right.clear();
            self.downstream.on_completed();
        }
    }

    fn fail(&self, error: StreamError) {
        let mut state = lock(&self.state);
        if state.terminated {
            return;
        }
        state.terminated = true;
        self.downstream.on_error(error);
    }
}

struct LeftObserver<A, B, T>(Arc<ZipCoordinator<A, B, T>>);

struct RightObserver<A, B, T>(Arc<ZipCoordinator<A, B, T>>);

impl<A: Send, B: Send, T: Send> Observer<A> for LeftObserver<A, B, T> {
    fn on_next(&mut self, value: A) {
        let mut state = lock(&self.0.state);
        if state.terminated {
            return;
        }
        state.left.push_back(value);
        self.0.drain(&mut state);
    }

    fn on_error(&mut self, error: StreamError) {
        self.0.fail(error);
    }

    fn on_completed(&mut self) {
        let mut state = lock(&self.0.state);
        state.left_done = true;
        self.0.drain(&mut state);
    }
}

impl<A: Send, B: Send, T: Send> Observer<B> for RightObserver<A, B, T> {
    fn on_next(&mut self, value: B) {
        let mut state = lock(&self.0.state);
        if state.terminated {
            return;
        }
        state.right.push_back(value);
        self.0.drain(&mut state);
    }

    fn on_error(&mut self, error: StreamError) {
        self.0.fail(error);
    }

    fn on_completed(&mut self) {
        let mut state = lock(&self.0.state);
        state.right_done = true;
        self.0.drain(&mut state);
    }
}

impl<T: Send + 'static> Observable<T> {
    /// Combine the i-th values of `left` and `right` with `combiner`.
    ///
    /// Emits no more items than the shorter source. Completes once either
    /// source has completed with nothing left to pair; an error from either
    /// side ends the stream and severs the other side.
    pub fn zip<A, B, F>(left: &Observable<A>, right: &Observable<B>, combiner: F) -> Observable<T>
    where
        A: Send + 'static,
        B: Send + 'static,
        F: Fn(A, B) -> T + Send + Sync + 'static,
    {
        let left = left.clone();
        let right = right.clone();
        let combiner: Arc<dyn Fn(A, B) -> T + Send + Sync> = Arc::new(combiner);

        Observable::create(move |downstream: Subscriber<T>| {
            let left_subscription = downstream.subscription().child();
            let right_subscription = downstream.subscription().child();
            let coordinator = Arc::new(ZipCoordinator {
                state: Mutex::new(ZipState {
                    left: VecDeque::new(),
                    right: VecDeque::new(),
                    left_done: false,
                    right_done: false,
                    terminated: false,
                }),
                combiner: combiner.clone(),
                downstream,
            });

            left.subscribe_subscriber(Subscriber::new(
                LeftObserver(coordinator.clone()),
                left_subscription,
            ));
            if right_subscription.is_unsubscribed() {
                return;
            }
            right.subscribe_subscriber(Subscriber::new(
                RightObserver(coordinator),
                right_subscription,
            ));
        })
    }

    /// Method form of [`Observable::zip`] with `self` on the left.
    pub fn zip_with<B, U, F>(&self, other: &Observable<B>, combiner: F) -> Observable<U>
    where
        B: Send + 'static,
        U: Send + 'static,
        F: Fn(T, B) -> U + Send + Sync + 'static,
    {
        Observable::zip(self, other, combiner)
    }
}
