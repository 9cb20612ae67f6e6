//! Application services fed by the chat-message channel.

pub mod chat;
pub mod links;
pub mod loth;

pub use chat::ChatService;
pub use loth::LothService;
