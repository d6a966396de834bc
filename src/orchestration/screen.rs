//! The main screen
//!
//! `on_create` builds and activates every demo pipeline. The network
//! pipeline does its blocking work on the IO scheduler and touches the
//! result view only from the UI scheduler.

use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::mpsc::UnboundedSender;

use super::{
    lifecycle::{SavedState, ScreenLifecycle},
    pipelines::{self, LoggingObserver},
    view::{Layout, TextView, ViewId},
};
use crate::{
    core::{StreamError, StreamResult, Subscription},
    fetch::{Fetcher, FETCH_TAG},
    scheduler::Scheduler,
};

/// Everything the screen needs from its host
#[derive(Clone)]
pub struct ScreenContext {
    /// UI-affine context; view updates happen here only
    pub ui: Arc<dyn Scheduler>,
    /// Background context for blocking fetches
    pub io: Arc<dyn Scheduler>,
    pub fetcher: Arc<dyn Fetcher>,
    pub primary_url: String,
    pub secondary_url: String,
}

/// Notifications for the host about screen creation and the network pipeline
#[derive(Debug, Clone)]
pub enum ScreenEvent {
    /// `on_create` itself failed; no pipeline was started
    CreateFailed(StreamError),
    ResultDisplayed(String),
    FetchFailed(StreamError),
    FetchCompleted,
}

pub struct MainScreen {
    context: ScreenContext,
    lifecycle: ScreenLifecycle,
    layout: Option<Layout>,
    subscriptions: Vec<Subscription>,
    events: Option<UnboundedSender<ScreenEvent>>,
}

impl MainScreen {
    pub fn new(context: ScreenContext) -> Self {
        Self {
            context,
            lifecycle: ScreenLifecycle::new("MainScreen"),
            layout: None,
            subscriptions: Vec::new(),
            events: None,
        }
    }

    /// Report network pipeline outcomes on `events`.
    pub fn with_events(mut self, events: UnboundedSender<ScreenEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Build and activate all pipelines. Runs once per screen.
    ///
    /// Pipeline failures are delivered to their error callbacks; only a
    /// lifecycle or layout problem makes this return an error.
    pub fn on_create(&mut self, _saved_state: Option<&SavedState>) -> StreamResult<()> {
        let result = self.activate();
        if let Err(err) = &result {
            error!("MainScreen creation failed: {err}");
            notify(&self.events, ScreenEvent::CreateFailed(err.clone()));
        }
        result
    }

    fn activate(&mut self) -> StreamResult<()> {
        self.lifecycle.create()?;

        let layout = Layout::inflate_main();
        let result_view = layout
            .find_view_by_id(ViewId::RESULT_TEXT)
            .ok_or_else(|| StreamError::NotFound(format!("view {}", ViewId::RESULT_TEXT)))?;
        self.layout = Some(layout);

        let hello = pipelines::hello();
        self.keep(hello.subscribe(LoggingObserver::new(pipelines::MY_OBSERVER_TAG)));
        self.keep(hello.subscribe_next(|s| debug!(target: pipelines::MY_ACTION_TAG, "{s}")));

        self.keep(
            pipelines::words().subscribe_next(|s| debug!(target: pipelines::RX_RESULT_TAG, "{s}")),
        );

        self.keep(
            pipelines::squared_evens()
                .subscribe_next(|v| debug!(target: pipelines::ARRAY_INTEGERS_TAG, "{v}")),
        );

        self.keep(
            pipelines::greetings().subscribe_next(|s| debug!(target: pipelines::ZIP_TAG, "{s}")),
        );

        let fetch_subscription = self.subscribe_body_lengths(result_view);
        self.keep(fetch_subscription);

        info!("MainScreen created with {} subscriptions", self.subscriptions.len());
        Ok(())
    }

    fn subscribe_body_lengths(&self, result_view: TextView) -> Subscription {
        let context = &self.context;
        let (on_next_events, on_error_events, on_completed_events) =
            (self.events.clone(), self.events.clone(), self.events.clone());

        pipelines::body_lengths(
            context.fetcher.clone(),
            &context.primary_url,
            &context.secondary_url,
        )
        .subscribe_on(context.io.clone())
        .observe_on(context.ui.clone())
        .subscribe_with(
            move |lengths: String| {
                result_view.set_text(lengths.clone());
                debug!(target: FETCH_TAG, "Result view updated: {lengths:?}");
                notify(&on_next_events, ScreenEvent::ResultDisplayed(lengths));
            },
            move |err| {
                error!(target: FETCH_TAG, "Fetch failed: {err}");
                notify(&on_error_events, ScreenEvent::FetchFailed(err));
            },
            move || {
                info!(target: FETCH_TAG, "Fetch completed");
                notify(&on_completed_events, ScreenEvent::FetchCompleted);
            },
        )
    }

    fn keep(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Sever every subscription made by `on_create`.
    pub fn on_destroy(&mut self) {
        if !self.lifecycle.destroy() {
            return;
        }
        for subscription in self.subscriptions.drain(..) {
            subscription.unsubscribe();
        }
    }

    pub fn result_view(&self) -> Option<TextView> {
        self.layout
            .as_ref()
            .and_then(|layout| layout.find_view_by_id(ViewId::RESULT_TEXT))
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }
}

fn notify(events: &Option<UnboundedSender<ScreenEvent>>, event: ScreenEvent) {
    if let Some(events) = events {
        let _ = events.send(event);
    }
}
