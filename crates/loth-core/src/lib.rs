//! loth core: transport-agnostic chat protocol primitives and error types.
//!
//! This crate defines the line protocol spoken with the chat service (a 3-letter
//! tag, an optional space, an optional JSON body) and the typed commands built
//! on top of it. It carries no transport or runtime dependencies so the bot,
//! its tests, and any tooling can share one codec.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Every malformed frame surfaces as `LothError`/`Result` so a hostile or
//! buggy peer cannot take the read loop down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{LothError, Result};
