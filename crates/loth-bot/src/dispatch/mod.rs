//! Dispatcher module exports.
//!
//! The dispatcher is the read task: it classifies raw frames, answers
//! keep-alives in place, and forwards chat messages to the application task.

pub mod dispatcher;

pub use dispatcher::{Dispatched, Dispatcher};
