//! Shared application state for one bot session.
//!
//! Built once at startup and handed by reference to every task that needs it;
//! there is no ambient global state.

use std::sync::Arc;

use loth_core::error::Result;

use crate::config::BotConfig;
use crate::infra::{HttpTicketSource, LogMessageStore, MessageStore, TicketSource};
use crate::presence::{LothSlot, PresenceStore};

#[derive(Clone)]
pub struct AppState {
    cfg: Arc<BotConfig>,
    presence: Arc<PresenceStore>,
    loth: Arc<LothSlot>,
    store: Arc<dyn MessageStore>,
    tickets: Arc<dyn TicketSource>,
}

impl AppState {
    /// Production wiring: HTTP ticketing, log-backed persistence.
    /// Returns Result so main can report startup errors instead of panicking.
    pub fn new(cfg: BotConfig) -> Result<Self> {
        let tickets = HttpTicketSource::new(cfg.chat.ticket_url.clone(), cfg.chat.ticket_timeout())?;
        Ok(Self::with_collaborators(cfg, Arc::new(tickets), Arc::new(LogMessageStore::new())))
    }

    pub fn with_collaborators(
        cfg: BotConfig,
        tickets: Arc<dyn TicketSource>,
        store: Arc<dyn MessageStore>,
    ) -> Self {
        Self {
            cfg: Arc::new(cfg),
            presence: Arc::new(PresenceStore::new()),
            loth: Arc::new(LothSlot::new()),
            store,
            tickets,
        }
    }

    pub fn cfg(&self) -> &BotConfig {
        &self.cfg
    }

    pub fn presence(&self) -> Arc<PresenceStore> {
        Arc::clone(&self.presence)
    }

    pub fn loth(&self) -> Arc<LothSlot> {
        Arc::clone(&self.loth)
    }

    pub fn store(&self) -> Arc<dyn MessageStore> {
        Arc::clone(&self.store)
    }

    pub fn tickets(&self) -> Arc<dyn TicketSource> {
        Arc::clone(&self.tickets)
    }
}
