//! Screen orchestration layer
//!
//! This module builds the demo pipelines and drives them from the main
//! screen's lifecycle callbacks.

pub mod lifecycle;
pub mod pipelines;
pub mod screen;
pub mod view;

pub use lifecycle::{LifecyclePhase, SavedState, ScreenLifecycle};
pub use screen::{MainScreen, ScreenContext, ScreenEvent};
pub use view::{Layout, TextView, ViewId};
