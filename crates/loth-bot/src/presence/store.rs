use std::collections::HashMap;

use parking_lot::RwLock;

use super::participant::{Participant, Status};

/// Participant name -> participant, for one channel (or a merged view).
pub type Roster = HashMap<String, Participant>;

/// Channel presence: channel -> roster.
///
/// A single lock guards the whole table, so every call sees (and leaves) a
/// consistent cut: a reader never observes a half-applied update. Rosters are
/// created lazily and kept once empty.
#[derive(Default)]
pub struct PresenceStore {
    channels: RwLock<HashMap<String, Roster>>,
}

impl PresenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `participant` in `channel`.
    pub fn set_participant(&self, channel: &str, participant: Participant) {
        self.channels
            .write()
            .entry(channel.to_string())
            .or_default()
            .insert(participant.name.clone(), participant);
    }

    /// Remove `name` from `channel`; no-op if absent.
    pub fn remove_participant(&self, channel: &str, name: &str) {
        if let Some(roster) = self.channels.write().get_mut(channel) {
            roster.remove(name);
        }
    }

    /// Remove `name` from every channel (service-wide disconnect).
    pub fn remove_participant_from_all_channels(&self, name: &str) {
        for roster in self.channels.write().values_mut() {
            roster.remove(name);
        }
    }

    /// Update the status of an existing entry. Never creates one.
    pub fn set_status(&self, channel: &str, name: &str, status: Status) {
        if let Some(p) = self
            .channels
            .write()
            .get_mut(channel)
            .and_then(|roster| roster.get_mut(name))
        {
            p.status = status;
        }
    }

    /// One representative entry for `name` plus every channel it appears in
    /// (sorted). `None` when it is in no roster.
    pub fn get_participant(&self, name: &str) -> Option<(Participant, Vec<String>)> {
        let channels = self.channels.read();
        let mut found: Option<Participant> = None;
        let mut names = Vec::new();

        for (channel, roster) in channels.iter() {
            if let Some(p) = roster.get(name) {
                if found.is_none() {
                    found = Some(p.clone());
                }
                names.push(channel.clone());
            }
        }

        names.sort();
        found.map(|p| (p, names))
    }

    /// Everyone with an active status in any channel, each name once.
    pub fn active_participants(&self) -> Roster {
        let channels = self.channels.read();
        let mut merged = Roster::new();
        for p in channels.values().flat_map(|r| r.values()) {
            if p.is_active() && !merged.contains_key(&p.name) {
                merged.insert(p.name.clone(), p.clone());
            }
        }
        merged
    }

    /// Snapshot of one channel's roster.
    pub fn channel_roster(&self, channel: &str) -> Option<Roster> {
        self.channels.read().get(channel).cloned()
    }

    /// `name`'s entry on `channel`'s roster.
    pub fn participant_in(&self, channel: &str, name: &str) -> Option<Participant> {
        self.channels.read().get(channel).and_then(|roster| roster.get(name)).cloned()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::presence::Role;

    fn p(name: &str, status: Status) -> Participant {
        Participant::new(name, Role::Unknown, status)
    }

    #[test]
    fn set_creates_roster_lazily() {
        let store = PresenceStore::new();
        assert!(store.channel_roster("room1").is_none());

        store.set_participant("room1", p("bob", Status::Online));
        let roster = store.channel_roster("room1").unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster["bob"].status, Status::Online);
    }

    #[test]
    fn set_overwrites_same_name() {
        let store = PresenceStore::new();
        store.set_participant("room1", p("bob", Status::Online));
        store.set_participant("room1", Participant::new("bob", Role::Switch, Status::Away));

        let roster = store.channel_roster("room1").unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster["bob"].role, Role::Switch);
    }

    #[test]
    fn removed_participant_is_not_reported_until_readded() {
        let store = PresenceStore::new();
        store.set_participant("room1", p("bob", Status::Online));
        store.set_participant("room2", p("bob", Status::Online));

        store.remove_participant("room1", "bob");
        assert!(store.participant_in("room1", "bob").is_none());
        let (_, chans) = store.get_participant("bob").unwrap();
        assert_eq!(chans, vec!["room2".to_string()]);

        // removing again is a no-op, as is removing from a missing channel
        store.remove_participant("room1", "bob");
        store.remove_participant("nowhere", "bob");

        store.set_participant("room1", p("bob", Status::Online));
        assert!(store.participant_in("room1", "bob").is_some());
        // empty rosters are retained
        store.remove_participant("room1", "bob");
        assert_eq!(store.channel_roster("room1").map(|r| r.len()), Some(0));
    }

    #[test]
    fn remove_from_all_channels() {
        let store = PresenceStore::new();
        for ch in ["a", "b", "c"] {
            store.set_participant(ch, p("bob", Status::Online));
            store.set_participant(ch, p("amy", Status::Online));
        }
        store.remove_participant_from_all_channels("bob");

        assert!(store.get_participant("bob").is_none());
        let (_, chans) = store.get_participant("amy").unwrap();
        assert_eq!(chans, vec!["a", "b", "c"]);
    }

    #[test]
    fn set_status_never_creates_entries() {
        let store = PresenceStore::new();
        store.set_status("room1", "bob", Status::Busy);
        assert!(store.channel_roster("room1").is_none());
        assert!(store.get_participant("bob").is_none());

        store.set_participant("room1", p("bob", Status::Online));
        store.set_status("room1", "bob", Status::Idle);
        assert_eq!(store.channel_roster("room1").unwrap()["bob"].status, Status::Idle);
    }

    #[test]
    fn active_participants_are_merged_once() {
        let store = PresenceStore::new();
        store.set_participant("a", p("bob", Status::Online));
        store.set_participant("b", p("bob", Status::Looking));
        store.set_participant("a", p("amy", Status::Away));
        store.set_participant("b", p("cat", Status::Idle));
        store.set_participant("c", p("cat", Status::Busy));
        store.set_participant("c", p("dan", Status::Offline));

        let active = store.active_participants();
        let mut names: Vec<_> = active.keys().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["bob", "cat"]);
    }

    #[test]
    fn get_participant_absent() {
        let store = PresenceStore::new();
        assert!(store.get_participant("ghost").is_none());
    }

    #[test]
    fn concurrent_mutation_and_iteration() {
        let store = Arc::new(PresenceStore::new());
        store.set_participant("stable", p("keeper", Status::Online));

        let mut handles = Vec::new();
        for t in 0..4 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for i in 0..500 {
                    let name = format!("u{t}-{i}");
                    let ch = format!("ch{}", i % 7);
                    store.set_participant(&ch, p(&name, Status::Online));
                    let _ = store.active_participants();
                    store.remove_participant(&ch, &name);
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }

        let active = store.active_participants();
        assert_eq!(active.len(), 1);
        let (_, chans) = store.get_participant("keeper").unwrap();
        assert_eq!(chans, vec!["stable".to_string()]);
    }
}
