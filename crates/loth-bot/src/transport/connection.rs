//! WebSocket connection to the chat service.
//!
//! Responsibilities:
//! - Own the socket: the write half sits behind an async mutex so concurrent
//!   senders never interleave, the read half belongs to a pump task.
//! - Pump text messages into a bounded frame channel. A full channel pauses
//!   the pump (backpressure) rather than dropping frames.
//! - Fire the `closed` signal once when the pump ends (read error or the
//!   socket closing). A dropped frame receiver only stops delivery.
//!
//! The pump's socket read cannot observe a cancellation signal; `close()`
//! aborts the pump task, which drops the read half and releases the socket.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use loth_core::error::{LothError, Result};
use loth_core::protocol::{Command, Frame};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Cloneable handle to one live connection.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

struct Inner {
    sink: Mutex<WsSink>,
    closed: CancellationToken,
    pump: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl Connection {
    /// Dial `url` and start the read pump. Frames arrive on the returned
    /// receiver, which holds at most `frame_buffer` unread frames.
    pub async fn connect(url: &str, frame_buffer: usize) -> Result<(Self, mpsc::Receiver<Frame>)> {
        let (ws, _resp) = connect_async(url)
            .await
            .map_err(|e| LothError::Transport(format!("connect {url}: {e}")))?;

        let (sink, source) = ws.split();
        let (frames_tx, frames_rx) = mpsc::channel(frame_buffer.max(1));
        let closed = CancellationToken::new();

        let pump = tokio::spawn(read_loop(source, frames_tx, closed.clone()));

        tracing::info!(%url, "connected");
        let conn = Self {
            inner: Arc::new(Inner {
                sink: Mutex::new(sink),
                closed,
                pump: parking_lot::Mutex::new(Some(pump)),
            }),
        };
        Ok((conn, frames_rx))
    }

    /// Write one frame. Holds the write lock for the whole message.
    pub async fn send_frame(&self, frame: &Frame) -> Result<()> {
        let text = frame.to_text()?;
        let mut sink = self.inner.sink.lock().await;
        sink.send(Message::Text(text.into()))
            .await
            .map_err(|e| LothError::Transport(format!("send failed: {e}")))
    }

    pub async fn send(&self, cmd: &Command) -> Result<()> {
        self.send_frame(&cmd.encode()?).await
    }

    /// Send a close frame and wait (bounded) for the pump to see the reply.
    pub async fn disconnect(&self, wait: Duration) -> Result<()> {
        {
            let mut sink = self.inner.sink.lock().await;
            sink.send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "bye".into(),
            })))
            .await
            .map_err(|e| LothError::Transport(format!("close failed: {e}")))?;
        }

        if tokio::time::timeout(wait, self.closed()).await.is_err() {
            tracing::warn!(wait_ms = wait.as_millis() as u64, "close not acknowledged in time");
        }
        Ok(())
    }

    /// Release the socket unconditionally. Idempotent.
    pub async fn close(&self) {
        if let Some(pump) = self.inner.pump.lock().take() {
            pump.abort();
        }
        let _ = self.inner.sink.lock().await.close().await;
        self.inner.closed.cancel();
    }

    /// Resolves once the connection is gone.
    pub async fn closed(&self) {
        self.inner.closed.cancelled().await
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }
}

async fn read_loop(mut source: WsSource, frames: mpsc::Sender<Frame>, closed: CancellationToken) {
    let mut frames = Some(frames);
    while let Some(next) = source.next().await {
        let frame = match next {
            Ok(Message::Text(text)) => Frame::from_bytes(Bytes::copy_from_slice(text.as_bytes())),
            Ok(Message::Binary(bin)) => Frame::from_bytes(bin),
            Ok(Message::Close(reason)) => {
                tracing::info!(?reason, "remote closed connection");
                continue;
            }
            // tungstenite answers pings itself
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(error = %e, "read failed");
                break;
            }
        };

        // with nobody listening, keep reading so a close reply is still seen
        if let Some(tx) = &frames {
            if tx.send(frame).await.is_err() {
                tracing::debug!("frame receiver dropped; discarding further frames");
                frames = None;
            }
        }
    }

    tracing::debug!("read pump stopped");
    closed.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::net::TcpListener;
    use tokio::time::timeout;
    use tokio_tungstenite::accept_async;

    const WAIT: Duration = Duration::from_secs(5);

    async fn listen() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        (listener, url)
    }

    #[tokio::test]
    async fn frames_arrive_in_order_then_closed_fires() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            for text in ["PIN", "LIS {}", r#"MSG {"character":"a","channel":"b","message":"c"}"#] {
                ws.send(Message::Text(text.into())).await.unwrap();
            }
            ws.close(None).await.unwrap();
            while ws.next().await.is_some() {}
        });

        let (conn, mut frames) = Connection::connect(&url, 100).await.unwrap();
        let mut got = Vec::new();
        while let Ok(Some(f)) = timeout(WAIT, frames.recv()).await {
            got.push(f.to_text().unwrap());
        }
        assert_eq!(got.len(), 3);
        assert_eq!(got[0], "PIN");
        assert!(got[1].starts_with("LIS"));

        timeout(WAIT, conn.closed()).await.unwrap();
        assert!(conn.is_closed());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_senders_do_not_interleave() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            let mut got = Vec::new();
            while got.len() < 40 {
                match ws.next().await {
                    Some(Ok(Message::Text(t))) => got.push(t.as_str().to_string()),
                    _ => break,
                }
            }
            got
        });

        let (conn, _frames) = Connection::connect(&url, 100).await.unwrap();
        let mut tasks = Vec::new();
        for _ in 0..2 {
            let conn = conn.clone();
            tasks.push(tokio::spawn(async move {
                for _ in 0..20 {
                    conn.send(&Command::Ping).await.unwrap();
                }
            }));
        }
        for t in tasks {
            t.await.unwrap();
        }

        let got = timeout(WAIT, server).await.unwrap().unwrap();
        assert_eq!(got.len(), 40);
        assert!(got.iter().all(|m| m == "PIN"));
        conn.close().await;
    }

    #[tokio::test]
    async fn disconnect_is_acknowledged() {
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            let mut saw_close = false;
            while let Some(Ok(msg)) = ws.next().await {
                if msg.is_close() {
                    saw_close = true;
                }
            }
            saw_close
        });

        let (conn, _frames) = Connection::connect(&url, 100).await.unwrap();
        conn.disconnect(Duration::from_secs(2)).await.unwrap();
        assert!(conn.is_closed());
        conn.close().await;
        conn.close().await;
        assert!(timeout(WAIT, server).await.unwrap().unwrap());
    }

    #[tokio::test]
    async fn full_frame_channel_pauses_the_pump() {
        const N: usize = 500;
        let (listener, url) = listen().await;
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            for i in 0..N {
                ws.send(Message::Text(format!("XYZ {i}").into())).await.unwrap();
            }
            ws.close(None).await.unwrap();
            while ws.next().await.is_some() {}
        });

        let (conn, mut frames) = Connection::connect(&url, 1).await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!conn.is_closed());

        let mut got = Vec::new();
        while let Ok(Some(f)) = timeout(WAIT, frames.recv()).await {
            got.push(f.to_text().unwrap());
        }
        let want: Vec<String> = (0..N).map(|i| format!("XYZ {i}")).collect();
        assert_eq!(got, want);

        timeout(WAIT, conn.closed()).await.unwrap();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn dropped_receiver_still_waits_for_close_reply() {
        let (listener, url) = listen().await;
        let (sent_tx, sent_rx) = tokio::sync::oneshot::channel();
        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            ws.send(Message::Text("LIS {}".into())).await.unwrap();
            ws.send(Message::Text("LIS {}".into())).await.unwrap();
            let _ = sent_tx.send(());
            let mut saw_close = false;
            while let Some(Ok(msg)) = ws.next().await {
                if msg.is_close() {
                    saw_close = true;
                }
            }
            saw_close
        });

        let (conn, frames) = Connection::connect(&url, 100).await.unwrap();
        drop(frames);
        sent_rx.await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        // incoming data alone does not end the connection
        assert!(!conn.is_closed());

        conn.disconnect(Duration::from_secs(2)).await.unwrap();
        assert!(conn.is_closed());
        assert!(timeout(WAIT, server).await.unwrap().unwrap());
        conn.close().await;
    }
}
