use async_trait::async_trait;
use parking_lot::Mutex;

use loth_core::error::Result;
use loth_core::protocol::ChatMessage;

/// Records chat messages that carried links.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn record(&self, msg: &ChatMessage, urls: &[String]) -> Result<()>;
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub channel: String,
    pub character: String,
    pub message: String,
    pub urls: Vec<String>,
}

#[derive(Default)]
pub struct InMemoryMessageStore {
    records: Mutex<Vec<StoredMessage>>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<StoredMessage> {
        self.records.lock().clone()
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn record(&self, msg: &ChatMessage, urls: &[String]) -> Result<()> {
        self.records.lock().push(StoredMessage {
            channel: msg.channel.clone(),
            character: msg.character.clone(),
            message: msg.message.clone(),
            urls: urls.to_vec(),
        });
        Ok(())
    }
}

/// Writes records to the log instead of a database.
#[derive(Default)]
pub struct LogMessageStore;

impl LogMessageStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessageStore for LogMessageStore {
    async fn record(&self, msg: &ChatMessage, urls: &[String]) -> Result<()> {
        tracing::info!(
            channel = %msg.channel,
            character = %msg.character,
            urls = ?urls,
            "links recorded"
        );
        Ok(())
    }
}
