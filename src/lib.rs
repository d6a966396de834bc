//! This crate contains the core logic of rxscreen.
//!
//! It defines a small reactive-stream library (`core`), scheduler hand-off
//! (`scheduler`), deferred network fetches (`fetch`) and the screen that
//! wires them together (`orchestration`), plus configuration and logging.

pub mod config;
pub mod core;
pub mod fetch;
pub mod logging;
pub mod orchestration;
pub mod scheduler;
