//! Test helpers: an observer that records every signal it receives.

use std::{
    sync::{Arc, Condvar, Mutex},
    thread::{self, ThreadId},
    time::{Duration, Instant},
};

pub(crate) use super::observer::Notification as Event;
use super::observer::Observer;
use crate::core::StreamError;

pub(crate) const WAIT: Duration = Duration::from_secs(5);

struct Shared<T> {
    events: Mutex<Vec<(Event<T>, ThreadId)>>,
    changed: Condvar,
}

pub(crate) struct Recorder<T> {
    shared: Arc<Shared<T>>,
}

pub(crate) struct Events<T> {
    shared: Arc<Shared<T>>,
}

pub(crate) fn recorder<T>() -> (Recorder<T>, Events<T>) {
    let shared = Arc::new(Shared {
        events: Mutex::new(Vec::new()),
        changed: Condvar::new(),
    });
    (
        Recorder {
            shared: shared.clone(),
        },
        Events { shared },
    )
}

impl<T: Send> Recorder<T> {
    fn push(&mut self, event: Event<T>) {
        self.shared
            .events
            .lock()
            .unwrap()
            .push((event, thread::current().id()));
        self.shared.changed.notify_all();
    }
}

impl<T: Send> Observer<T> for Recorder<T> {
    fn on_next(&mut self, value: T) {
        self.push(Event::Next(value));
    }

    fn on_error(&mut self, error: StreamError) {
        self.push(Event::Error(error));
    }

    fn on_completed(&mut self) {
        self.push(Event::Completed);
    }
}

impl<T: Clone> Events<T> {
    pub(crate) fn snapshot(&self) -> Vec<Event<T>> {
        self.shared
            .events
            .lock()
            .unwrap()
            .iter()
            .map(|(event, _)| event.clone())
            .collect()
    }

    /// Threads on which each signal was delivered
    pub(crate) fn threads(&self) -> Vec<ThreadId> {
        self.shared
            .events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, thread)| *thread)
            .collect()
    }

    /// Block until a terminal signal arrives or `timeout` elapses.
    pub(crate) fn wait_terminal(&self, timeout: Duration) -> Vec<Event<T>> {
        let deadline = Instant::now() + timeout;
        let mut events = self.shared.events.lock().unwrap();
        while !events.iter().any(|(event, _)| event.is_terminal()) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            events = self
                .shared
                .changed
                .wait_timeout(events, deadline - now)
                .unwrap()
                .0;
        }
        drop(events);
        self.snapshot()
    }
}

pub(crate) fn values<T: Clone>(events: &[Event<T>]) -> Vec<T> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Next(value) => Some(value.clone()),
            _ => None,
        })
        .collect()
}

pub(crate) fn is_completed<T>(events: &[Event<T>]) -> bool {
    matches!(events.last(), Some(Event::Completed))
}

pub(crate) fn error_of<T>(events: &[Event<T>]) -> Option<&StreamError> {
    events.iter().find_map(|event| match event {
        Event::Error(err) => Some(err),
        _ => None,
    })
}

pub(crate) fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}
