//! Deferred network fetches
//!
//! A fetch is modelled as a zero-argument computation that only runs when
//! the pipeline is activated. The body is reduced to its character count
//! before it enters the stream.

mod http;

use std::{sync::Arc, thread};

use log::debug;

use crate::core::{Observable, StreamResult};

pub use http::{HttpFetcher, DEFAULT_TIMEOUT};

pub const FETCH_TAG: &str = "Fetch";

/// Blocking read of a whole response body
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> StreamResult<String>;
}

impl<F: Fetcher + ?Sized> Fetcher for Arc<F> {
    fn fetch(&self, url: &str) -> StreamResult<String> {
        (**self).fetch(url)
    }
}

/// Stream that fetches `url` on activation and emits the body length.
///
/// Emits exactly one decimal string and completes, or fails with the
/// underlying I/O error without emitting.
pub fn deferred_fetch<F>(fetcher: F, url: impl Into<String>) -> Observable<String>
where
    F: Fetcher + 'static,
{
    let url = url.into();
    Observable::from_callable(move || {
        debug!(
            target: FETCH_TAG,
            "GET {url} on thread {}",
            thread::current().name().unwrap_or("unnamed")
        );
        let body = fetcher.fetch(&url)?;
        let length = body.chars().count().to_string();
        debug!(target: FETCH_TAG, "{url} -> {length} chars");
        Ok(length)
    })
}
