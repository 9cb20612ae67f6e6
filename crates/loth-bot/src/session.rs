//! Session orchestration.
//!
//! Ticket -> connect -> start read and chat tasks -> identify -> wait for an
//! interrupt or the connection dropping -> close handshake -> stop both
//! tasks -> release the socket. Nothing here reconnects; a supervisor restarts
//! the process.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use loth_core::error::Result;
use loth_core::protocol::{Command, Identify};

use crate::app_state::AppState;
use crate::dispatch::Dispatcher;
use crate::infra::Credentials;
use crate::services::links::LinkExtractor;
use crate::services::{ChatService, LothService};
use crate::transport::Connection;

/// Upper bound for a stopped task to wind down.
const TASK_JOIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Why a session ended without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Shutdown signal received; a graceful disconnect was attempted.
    Interrupted,
    /// The connection went away on its own.
    ConnectionLost,
}

/// A long-running task plus its stop signal.
struct Task {
    name: &'static str,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Task {
    fn spawn<F>(name: &'static str, f: impl FnOnce(CancellationToken) -> F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(f(cancel.clone()));
        Self { name, cancel, handle }
    }

    /// Safe to call on a task that already exited.
    fn signal(&self) {
        self.cancel.cancel();
    }

    async fn join(self) {
        self.signal();
        match tokio::time::timeout(TASK_JOIN_TIMEOUT, self.handle).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(task = self.name, error = %e, "task failed"),
            Err(_) => tracing::warn!(task = self.name, "task did not stop in time"),
        }
    }
}

pub struct Session {
    state: AppState,
}

impl Session {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Run one session until `shutdown` resolves or the connection drops.
    ///
    /// Ticket, connect, and identify failures are returned before any task
    /// outlives this call.
    pub async fn run<S>(&self, creds: &Credentials, shutdown: S) -> Result<SessionEnd>
    where
        S: Future<Output = ()>,
    {
        let cfg = self.state.cfg();
        let links = LinkExtractor::new()?;

        let ticket = self.state.tickets().acquire(creds).await?;
        let (conn, frames) = Connection::connect(&cfg.chat.url, cfg.chat.frame_buffer).await?;

        let (msg_tx, msg_rx) = mpsc::channel(cfg.chat.message_buffer);

        let dispatcher = Dispatcher::new(conn.clone(), msg_tx, cfg.channels.clone());
        let read_task = Task::spawn("read", move |cancel| dispatcher.run(frames, cancel));

        let loth = LothService::new(
            self.state.presence(),
            self.state.loth(),
            cfg.loth.command.clone(),
            cfg.loth.duration(),
            creds.character.clone(),
        );
        let chat = ChatService::new(
            self.state.presence(),
            self.state.store(),
            loth,
            links,
            conn.clone(),
        );
        let chat_task = Task::spawn("chat", move |cancel| chat.run(msg_rx, cancel));

        let identify = Command::Identify(Identify::new(
            creds.account.clone(),
            ticket,
            creds.character.clone(),
            cfg.chat.client_name.clone(),
            cfg.chat.client_version.clone(),
        ));
        if let Err(e) = conn.send(&identify).await {
            read_task.signal();
            chat_task.signal();
            conn.close().await;
            read_task.join().await;
            chat_task.join().await;
            return Err(e);
        }
        tracing::info!(character = %creds.character, "identify sent");

        let end = tokio::select! {
            _ = shutdown => SessionEnd::Interrupted,
            _ = conn.closed() => SessionEnd::ConnectionLost,
        };

        // the read task keeps consuming until the close handshake is done
        match end {
            SessionEnd::Interrupted => {
                tracing::info!("shutting down");
                if let Err(e) = conn.disconnect(cfg.chat.disconnect_timeout()).await {
                    tracing::warn!(error = %e, "graceful disconnect failed");
                }
            }
            SessionEnd::ConnectionLost => tracing::warn!("connection lost"),
        }

        read_task.signal();
        chat_task.signal();

        conn.close().await;
        read_task.join().await;
        chat_task.join().await;
        Ok(end)
    }
}
