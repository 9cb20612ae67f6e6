//! External collaborators: ticketing and message persistence.

pub mod message_store;
pub mod ticket;

pub use message_store::{InMemoryMessageStore, LogMessageStore, MessageStore, StoredMessage};
pub use ticket::{Credentials, HttpTicketSource, StaticTicketSource, TicketSource};
