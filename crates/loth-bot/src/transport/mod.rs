//! Transport layer (WebSocket client).
//!
//! Exposes the connection handle; frame decoding lives in `loth-core`.

pub mod connection;

pub use connection::Connection;
