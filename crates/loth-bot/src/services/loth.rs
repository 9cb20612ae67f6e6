//! The Loth command: show the current selection or draw a new one.

use std::sync::Arc;
use std::time::Duration;

use rand::seq::IteratorRandom;

use crate::presence::{format_countdown, Loth, LothSlot, Participant, PresenceStore};

pub struct LothService {
    presence: Arc<PresenceStore>,
    slot: Arc<LothSlot>,
    command: String,
    duration: Duration,
    own_character: String,
}

impl LothService {
    pub fn new(
        presence: Arc<PresenceStore>,
        slot: Arc<LothSlot>,
        command: impl Into<String>,
        duration: Duration,
        own_character: impl Into<String>,
    ) -> Self {
        Self {
            presence,
            slot,
            command: command.into(),
            duration,
            own_character: own_character.into(),
        }
    }

    /// Exact match after trimming both sides.
    pub fn is_command(&self, text: &str) -> bool {
        text.trim() == self.command.trim()
    }

    /// Reply text for a command invocation.
    pub fn respond(&self) -> String {
        if let Some(current) = self.slot.current() {
            return announce(&current);
        }
        match self.select() {
            Some(loth) => format!("{} has been chosen! {}", loth.participant().name, announce(&loth)),
            None => "Nobody is around to be the Loth.".to_string(),
        }
    }

    /// Draw uniformly among active participants (never ourselves) and replace
    /// the slot. Leaves the slot untouched when nobody is eligible.
    pub fn select(&self) -> Option<Loth> {
        let pick: Participant = self
            .presence
            .active_participants()
            .into_values()
            .filter(|p| p.name != self.own_character)
            .choose(&mut rand::rng())?;

        let loth = Loth::new(pick, self.duration);
        tracing::info!(
            character = %loth.participant().name,
            secs = self.duration.as_secs(),
            "new loth selected"
        );
        self.slot.replace(loth.clone());
        Some(loth)
    }
}

fn announce(loth: &Loth) -> String {
    format!(
        "{} is the Loth for another {}",
        loth.participant().name,
        format_countdown(loth.time_left())
    )
}
