use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::{Arc, Mutex},
    thread::{self, JoinHandle, ThreadId},
};

use log::{error, info, warn};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};

use super::{Scheduler, Task};
use crate::core::{error::panic_message, lock, StreamError, StreamResult};

enum LooperMessage {
    Run(Task),
    Quit,
}

/// A dedicated thread that runs posted tasks one at a time, in order.
///
/// This is the UI-affine context: anything that touches views is posted here.
pub struct Looper {
    name: String,
    sender: UnboundedSender<LooperMessage>,
    thread_id: ThreadId,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl Looper {
    pub fn spawn(name: &str) -> StreamResult<Self> {
        let (sender, mut receiver) = unbounded_channel::<LooperMessage>();
        let loop_name = name.to_string();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                info!("Looper {loop_name} started");
                while let Some(message) = receiver.blocking_recv() {
                    match message {
                        LooperMessage::Run(task) => {
                            if let Err(payload) = catch_unwind(AssertUnwindSafe(task)) {
                                error!(
                                    "Task on looper {loop_name} panicked: {}",
                                    panic_message(payload)
                                );
                            }
                        }
                        LooperMessage::Quit => break,
                    }
                }
                info!("Looper {loop_name} stopped");
            })?;

        Ok(Self {
            name: name.to_string(),
            sender,
            thread_id: join.thread().id(),
            join: Mutex::new(Some(join)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the looper thread
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    pub fn is_current_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// A scheduler that posts onto this looper
    pub fn scheduler(&self) -> LooperScheduler {
        LooperScheduler {
            name: Arc::from(self.name.as_str()),
            sender: self.sender.clone(),
            thread_id: self.thread_id,
        }
    }

    pub fn post<F>(&self, task: F) -> StreamResult<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(LooperMessage::Run(Box::new(task)))
            .map_err(|_| StreamError::Scheduler(format!("looper {} has quit", self.name)))
    }

    /// Stop after the tasks already posted, and wait for the thread to exit.
    ///
    /// When called from the looper thread itself the thread is not joined.
    pub fn quit(&self) {
        let _ = self.sender.send(LooperMessage::Quit);
        if self.is_current_thread() {
            return;
        }
        if let Some(join) = lock(&self.join).take() {
            if join.join().is_err() {
                warn!("Looper {} thread panicked", self.name);
            }
        }
    }
}

impl Drop for Looper {
    fn drop(&mut self) {
        let _ = self.sender.send(LooperMessage::Quit);
    }
}

/// Scheduler handle for a [`Looper`]
#[derive(Clone)]
pub struct LooperScheduler {
    name: Arc<str>,
    sender: UnboundedSender<LooperMessage>,
    thread_id: ThreadId,
}

impl LooperScheduler {
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }
}

impl Scheduler for LooperScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn schedule(&self, task: Task) {
        if self.sender.send(LooperMessage::Run(task)).is_err() {
            warn!("Looper {} has quit, dropping task", self.name);
        }
    }
}
