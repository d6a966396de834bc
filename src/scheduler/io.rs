use std::sync::Arc;

use log::debug;
use tokio::runtime::{Builder, Handle, Runtime};

use super::{Scheduler, Task};
use crate::core::StreamResult;

const IO_THREAD_NAME: &str = "rx-io";

/// Owns a runtime and shuts it down without waiting on blocking work, so the
/// last handle may be dropped from any thread.
struct OwnedRuntime(Option<Runtime>);

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        if let Some(runtime) = self.0.take() {
            runtime.shutdown_background();
        }
    }
}

/// Background scheduler for blocking work, backed by tokio's blocking pool
#[derive(Clone)]
pub struct IoScheduler {
    handle: Handle,
    runtime: Option<Arc<OwnedRuntime>>,
}

impl IoScheduler {
    /// Build a dedicated runtime with at most `max_threads` blocking workers.
    pub fn new(max_threads: usize) -> StreamResult<Self> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(max_threads.max(1))
            .thread_name(IO_THREAD_NAME)
            .enable_all()
            .build()?;
        debug!("IO scheduler started with {max_threads} blocking threads");

        Ok(Self {
            handle: runtime.handle().clone(),
            runtime: Some(Arc::new(OwnedRuntime(Some(runtime)))),
        })
    }

    /// Reuse the blocking pool of an existing runtime.
    pub fn from_handle(handle: Handle) -> Self {
        Self {
            handle,
            runtime: None,
        }
    }
}

impl Scheduler for IoScheduler {
    fn name(&self) -> &str {
        IO_THREAD_NAME
    }

    fn schedule(&self, task: Task) {
        // A queued task keeps an owned runtime alive until it has run.
        let runtime = self.runtime.clone();
        drop(self.handle.spawn_blocking(move || {
            let _runtime = runtime;
            task()
        }));
    }
}
