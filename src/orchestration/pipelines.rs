//! The demo pipelines wired up by the main screen
//!
//! Each function only builds a cold stream; nothing runs until the screen
//! subscribes.

use log::debug;

use crate::{
    core::{Observable, Observer, StreamError},
    fetch::{deferred_fetch, Fetcher},
};

pub const MY_OBSERVER_TAG: &str = "MY OBSERVER";
pub const MY_ACTION_TAG: &str = "My Action";
pub const RX_RESULT_TAG: &str = "RXResult";
pub const ARRAY_INTEGERS_TAG: &str = "Array Integers";
pub const ZIP_TAG: &str = "Zip";

/// Square with the native `i32` overflow behaviour (two's complement wrap).
pub fn square(value: i32) -> i32 {
    value.wrapping_mul(value)
}

pub fn is_even(value: &i32) -> bool {
    value % 2 == 0
}

/// Join two results one per line.
pub fn join_lines(first: String, second: String) -> String {
    format!("{first}\n{second}")
}

pub fn hello() -> Observable<String> {
    Observable::just("Hello".to_string())
}

pub fn words() -> Observable<String> {
    Observable::from_iter(["One", "Two", "Three"].map(String::from))
}

/// `[1..=6]` squared, first two dropped, evens kept: emits 16 then 36.
pub fn squared_evens() -> Observable<i32> {
    Observable::from_iter(vec![1, 2, 3, 4, 5, 6])
        .map(square)
        .skip(2)
        .filter(is_even)
}

pub fn greetings() -> Observable<String> {
    Observable::zip(
        &Observable::just("Hello-A".to_string()),
        &Observable::just("Hello-B".to_string()),
        join_lines,
    )
}

/// Body lengths of two pages, one per line, once both fetches have finished.
pub fn body_lengths<F>(fetcher: F, first_url: &str, second_url: &str) -> Observable<String>
where
    F: Fetcher + Clone + 'static,
{
    Observable::zip(
        &deferred_fetch(fetcher.clone(), first_url),
        &deferred_fetch(fetcher, second_url),
        join_lines,
    )
}

/// Full observer that logs every signal under one tag
pub struct LoggingObserver {
    tag: &'static str,
}

impl LoggingObserver {
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl<T: std::fmt::Display> Observer<T> for LoggingObserver {
    fn on_next(&mut self, value: T) {
        debug!(target: self.tag, "{value}");
    }

    fn on_error(&mut self, error: StreamError) {
        debug!(target: self.tag, "error: {error}");
    }

    fn on_completed(&mut self) {
        debug!(target: self.tag, "completed");
    }
}
