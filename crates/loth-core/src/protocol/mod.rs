//! Chat line protocol.
//!
//! Every frame is `TAG` or `TAG {json}` where `TAG` is exactly three ASCII
//! letters:
//! - `frame`: raw frame handling (tag split, body encode/decode).
//! - `command`: typed commands the client understands (`PIN`, `IDN`, `MSG`).
//!
//! All parsers are panic-free: malformed input is reported as `LothError`
//! instead of panicking or indexing raw buffers.

pub mod command;
pub mod frame;

pub use command::{ChatMessage, Command, Identify, JoinChannel, SendMessage};
pub use frame::{Frame, TAG_LEN};
