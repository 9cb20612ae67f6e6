use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use loth_core::protocol::{ChatMessage, Command, Frame, JoinChannel};

use crate::transport::Connection;

/// What happened to one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatched {
    /// Keep-alive answered.
    Pong,
    /// Identify acknowledged; configured channels were joined.
    Identified(String),
    /// Chat message handed to the application task.
    Forwarded,
    /// Tag not handled here.
    Unknown(String),
    /// Malformed frame or failed write; logged and skipped.
    Dropped,
    /// Cancelled, or the application task is gone.
    Stopped,
}

/// Classifies frames and routes them.
pub struct Dispatcher {
    conn: Connection,
    messages: mpsc::Sender<ChatMessage>,
    channels: Vec<String>,
}

impl Dispatcher {
    pub fn new(conn: Connection, messages: mpsc::Sender<ChatMessage>, channels: Vec<String>) -> Self {
        Self { conn, messages, channels }
    }

    /// Read task body. Returns when cancelled, when the frame channel closes,
    /// or when the application task stops receiving.
    pub async fn run(self, mut frames: mpsc::Receiver<Frame>, cancel: CancellationToken) {
        loop {
            let frame = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = frames.recv() => match next {
                    Some(frame) => frame,
                    None => break,
                },
            };

            if self.dispatch(frame, &cancel).await == Dispatched::Stopped {
                break;
            }
        }
        tracing::debug!("read task stopped");
    }

    pub async fn dispatch(&self, frame: Frame, cancel: &CancellationToken) -> Dispatched {
        let cmd = match Command::classify(&frame) {
            Ok(cmd) => cmd,
            Err(e) => {
                tracing::warn!(error = %e, "dropping frame");
                return Dispatched::Dropped;
            }
        };

        match cmd {
            // answered here, never queued behind chat handling
            Command::Ping => match self.conn.send(&Command::Ping).await {
                Ok(()) => Dispatched::Pong,
                Err(e) => {
                    tracing::warn!(error = %e, "ping reply failed");
                    Dispatched::Dropped
                }
            },
            Command::Identify(ack) => {
                tracing::info!(character = %ack.character, "identified");
                self.join_channels().await;
                Dispatched::Identified(ack.character)
            }
            Command::ChatMessage(msg) => {
                tracing::debug!(channel = %msg.channel, character = %msg.character, "chat message");
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Dispatched::Stopped,
                    sent = self.messages.send(msg) => match sent {
                        Ok(()) => Dispatched::Forwarded,
                        Err(_) => Dispatched::Stopped,
                    },
                }
            }
            Command::Unknown(frame) => {
                let tag = frame.tag().unwrap_or("???").to_string();
                tracing::trace!(%tag, "unhandled command");
                Dispatched::Unknown(tag)
            }
        }
    }

    async fn join_channels(&self) {
        for channel in &self.channels {
            let join = JoinChannel { channel: channel.clone() };
            let res = match join.frame() {
                Ok(frame) => self.conn.send_frame(&frame).await,
                Err(e) => Err(e),
            };
            match res {
                Ok(()) => tracing::info!(%channel, "joining channel"),
                Err(e) => tracing::warn!(%channel, error = %e, "join failed"),
            }
        }
    }
}
