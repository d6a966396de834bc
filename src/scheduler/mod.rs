//! Execution contexts for scheduler hand-off
//!
//! Schedulers are plain values passed to `subscribe_on` / `observe_on`; there
//! is no process-wide default.

mod hand_off;
mod io;
mod looper;

use std::sync::Arc;

pub use io::IoScheduler;
pub use looper::{Looper, LooperScheduler};

/// A unit of work handed to a scheduler
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Something that can run tasks somewhere
pub trait Scheduler: Send + Sync {
    /// Name used in log lines
    fn name(&self) -> &str;

    /// Queue `task` for execution. Must not block on the task itself.
    fn schedule(&self, task: Task);
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }
}

/// Runs every task inline on the calling thread
#[derive(Debug, Default, Clone, Copy)]
pub struct ImmediateScheduler;

impl Scheduler for ImmediateScheduler {
    fn name(&self) -> &str {
        "immediate"
    }

    fn schedule(&self, task: Task) {
        task()
    }
}
