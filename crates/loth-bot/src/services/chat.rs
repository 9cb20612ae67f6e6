use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use loth_core::protocol::{ChatMessage, SendMessage};

use crate::infra::MessageStore;
use crate::presence::{Participant, PresenceStore, Status};
use crate::services::links::LinkExtractor;
use crate::services::LothService;
use crate::transport::Connection;

/// Application task: the single consumer of forwarded chat messages.
pub struct ChatService {
    presence: Arc<PresenceStore>,
    store: Arc<dyn MessageStore>,
    loth: LothService,
    links: LinkExtractor,
    conn: Connection,
}

impl ChatService {
    pub fn new(
        presence: Arc<PresenceStore>,
        store: Arc<dyn MessageStore>,
        loth: LothService,
        links: LinkExtractor,
        conn: Connection,
    ) -> Self {
        Self { presence, store, loth, links, conn }
    }

    pub async fn run(self, mut messages: mpsc::Receiver<ChatMessage>, cancel: CancellationToken) {
        loop {
            let msg = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = messages.recv() => match next {
                    Some(msg) => msg,
                    None => break,
                },
            };
            self.handle(msg).await;
        }
        tracing::debug!("chat task stopped");
    }

    pub async fn handle(&self, msg: ChatMessage) {
        self.touch_speaker(&msg);

        let urls = self.links.extract(&msg.message);
        if !urls.is_empty() {
            // failures never roll back presence
            if let Err(e) = self.store.record(&msg, &urls).await {
                tracing::warn!(channel = %msg.channel, error = %e, "record failed");
            }
        }

        if self.loth.is_command(&msg.message) {
            let reply = SendMessage {
                channel: msg.channel.clone(),
                message: self.loth.respond(),
            };
            let res = match reply.frame() {
                Ok(frame) => self.conn.send_frame(&frame).await,
                Err(e) => Err(e),
            };
            if let Err(e) = res {
                tracing::warn!(channel = %msg.channel, error = %e, "reply failed");
            }
        }
    }

    /// Whoever speaks is present and active in that channel.
    fn touch_speaker(&self, msg: &ChatMessage) {
        match self.presence.participant_in(&msg.channel, &msg.character) {
            Some(p) if !p.is_active() => {
                self.presence.set_status(&msg.channel, &msg.character, Status::Online);
            }
            Some(_) => {}
            None => {
                self.presence
                    .set_participant(&msg.channel, Participant::seen(msg.character.clone()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use futures_util::StreamExt;
    use tokio::net::TcpListener;
    use tokio::time::timeout;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{accept_async, WebSocketStream};

    use loth_core::error::{LothError, Result};

    use super::*;
    use crate::presence::{LothSlot, Role};

    const WAIT: Duration = Duration::from_secs(5);

    struct DownStore {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl MessageStore for DownStore {
        async fn record(&self, _msg: &ChatMessage, _urls: &[String]) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(LothError::Store("down".into()))
        }
    }

    async fn pair() -> (Connection, WebSocketStream<tokio::net::TcpStream>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let accept = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            accept_async(tcp).await.unwrap()
        });
        let (conn, _frames) = Connection::connect(&url, 100).await.unwrap();
        (conn, accept.await.unwrap())
    }

    fn msg(character: &str, message: &str) -> ChatMessage {
        ChatMessage {
            character: character.into(),
            message: message.into(),
            channel: "r".into(),
        }
    }

    #[tokio::test]
    async fn store_failure_leaves_presence_and_replies_intact() {
        let (conn, mut peer) = pair().await;
        let presence = Arc::new(PresenceStore::new());
        presence.set_participant("r", Participant::new("amy", Role::Switch, Status::Away));
        let store = Arc::new(DownStore { calls: AtomicUsize::new(0) });
        let loth = LothService::new(
            Arc::clone(&presence),
            Arc::new(LothSlot::new()),
            "!loth",
            Duration::from_secs(3600),
            "lothbot",
        );
        let svc = ChatService::new(
            Arc::clone(&presence),
            store.clone(),
            loth,
            LinkExtractor::new().unwrap(),
            conn.clone(),
        );

        svc.handle(msg("bob", "see http://x.test")).await;
        svc.handle(msg("amy", "back, https://y.test")).await;
        assert_eq!(store.calls.load(Ordering::SeqCst), 2);

        let bob = presence.participant_in("r", "bob").unwrap();
        assert_eq!(bob, Participant::seen("bob"));
        let amy = presence.participant_in("r", "amy").unwrap();
        assert_eq!(amy.role, Role::Switch);
        assert_eq!(amy.status, Status::Online);

        svc.handle(msg("lothbot", "!loth")).await;
        let reply = match timeout(WAIT, peer.next()).await.unwrap().unwrap().unwrap() {
            Message::Text(t) => t.as_str().to_string(),
            other => panic!("unexpected {other:?}"),
        };
        assert!(reply.starts_with("MSG "), "{reply}");
        assert!(reply.contains("has been chosen!"), "{reply}");
        conn.close().await;
    }
}
