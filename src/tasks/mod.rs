//! Background tasks module
//!
//! This module contains the background poll that runs alongside the HTTP server.

pub mod tick_poller;

// Re-export main functions
pub use tick_poller::tick_poll_task;
