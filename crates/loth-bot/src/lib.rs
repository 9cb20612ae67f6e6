//! loth bot library entry.
//!
//! This crate wires the transport, dispatcher, presence tracking, and chat
//! services into one session. It is consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod app_state;
pub mod config;
pub mod dispatch;
pub mod infra;
pub mod presence;
pub mod services;
pub mod session;
pub mod transport;
