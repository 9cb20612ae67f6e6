use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

use super::participant::Participant;

/// A time-limited selection of one participant.
///
/// Expiry is derived on every read; an expired `Loth` stays around until it is
/// replaced, so callers check [`Loth::expired`] before trusting `participant`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loth {
    participant: Participant,
    expires_at: Instant,
}

impl Loth {
    pub fn new(participant: Participant, duration: Duration) -> Self {
        Self::starting_at(participant, Instant::now(), duration)
    }

    pub fn starting_at(participant: Participant, start: Instant, duration: Duration) -> Self {
        Self { participant, expires_at: start + duration }
    }

    pub fn participant(&self) -> &Participant {
        &self.participant
    }

    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    pub fn expired(&self) -> bool {
        self.expired_at(Instant::now())
    }

    pub fn expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    /// Remaining time, floored to whole seconds, zero once expired.
    pub fn time_left(&self) -> Duration {
        self.time_left_at(Instant::now())
    }

    pub fn time_left_at(&self, now: Instant) -> Duration {
        let left = self.expires_at.saturating_duration_since(now);
        Duration::from_secs(left.as_secs())
    }
}

/// Session-wide single slot. Values are replaced whole, never patched.
#[derive(Default)]
pub struct LothSlot {
    current: RwLock<Option<Loth>>,
}

impl LothSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whatever is in the slot, expired or not.
    pub fn get(&self) -> Option<Loth> {
        self.current.read().clone()
    }

    /// The selection if it has not expired yet.
    pub fn current(&self) -> Option<Loth> {
        self.current.read().as_ref().filter(|l| !l.expired()).cloned()
    }

    /// Install `loth`, returning the previous value.
    pub fn replace(&self, loth: Loth) -> Option<Loth> {
        self.current.write().replace(loth)
    }

    pub fn clear(&self) -> Option<Loth> {
        self.current.write().take()
    }
}

/// `1h2m3s`, `4m5s`, `6s`.
pub fn format_countdown(d: Duration) -> String {
    let total = d.as_secs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{m}m{s}s")
    } else {
        format!("{s}s")
    }
}
