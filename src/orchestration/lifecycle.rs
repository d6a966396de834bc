//! Screen lifecycle bookkeeping
//!
//! Tracks which lifecycle callbacks have run so `on_create` happens exactly
//! once and `on_destroy` only after it.

use log::info;

use crate::core::{StreamError, StreamResult};

/// Opaque state handed to `on_create` by the host; never inspected.
#[derive(Clone, Debug, Default)]
pub struct SavedState {
    _private: (),
}

/// Lifecycle phase of a screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    Initialized,
    Created,
    Destroyed,
}

/// Manages the lifecycle phase of a screen
#[derive(Debug)]
pub struct ScreenLifecycle {
    name: String,
    phase: LifecyclePhase,
}

impl ScreenLifecycle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phase: LifecyclePhase::Initialized,
        }
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Enter the created phase; fails unless freshly initialized.
    pub fn create(&mut self) -> StreamResult<()> {
        if self.phase != LifecyclePhase::Initialized {
            return Err(StreamError::Lifecycle(format!(
                "{} cannot be created from phase {:?}",
                self.name, self.phase
            )));
        }
        info!("Creating {}...", self.name);
        self.phase = LifecyclePhase::Created;
        Ok(())
    }

    /// Enter the destroyed phase; returns false if there was nothing to tear down.
    pub fn destroy(&mut self) -> bool {
        if self.phase != LifecyclePhase::Created {
            return false;
        }
        info!("Destroying {}...", self.name);
        self.phase = LifecyclePhase::Destroyed;
        true
    }
}
