//! Subscription handles
//!
//! A [`Subscription`] is the consumer's grip on an active pipeline. Severing
//! it stops callback delivery; operators hang their upstream subscriptions
//! off it as children so the whole chain is torn down together.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use log::trace;
use uuid::Uuid;

use super::lock;

struct SubscriptionInner {
    id: Uuid,
    unsubscribed: AtomicBool,
    children: Mutex<Vec<Subscription>>,
}

/// Handle to an active consumer attachment
#[derive(Clone)]
pub struct Subscription {
    inner: Arc<SubscriptionInner>,
}

impl Subscription {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SubscriptionInner {
                id: Uuid::new_v4(),
                unsubscribed: AtomicBool::new(false),
                children: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Unique id, used in log lines
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.inner.unsubscribed.load(Ordering::Acquire)
    }

    /// Stop further callback delivery for this subscription and its children.
    ///
    /// Idempotent. Blocking work that is already running is not interrupted;
    /// its results are discarded.
    pub fn unsubscribe(&self) {
        if self.inner.unsubscribed.swap(true, Ordering::AcqRel) {
            return;
        }

        let children = std::mem::take(&mut *lock(&self.inner.children));
        for child in children {
            child.unsubscribe();
        }

        trace!("Subscription {} severed", self.inner.id);
    }

    /// Attach a child that is severed together with this subscription
    pub fn add(&self, child: Subscription) {
        let mut children = lock(&self.inner.children);
        if self.is_unsubscribed() {
            drop(children);
            child.unsubscribe();
            return;
        }
        children.push(child);
    }

    /// Create and attach a fresh child subscription
    pub fn child(&self) -> Subscription {
        let child = Subscription::new();
        self.add(child.clone());
        child
    }
}

impl Default for Subscription {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.inner.id)
            .field("unsubscribed", &self.is_unsubscribed())
            .finish()
    }
}
