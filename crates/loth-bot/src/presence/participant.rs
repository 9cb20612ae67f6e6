/// Role classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    Unknown,
    Dominant,
    Submissive,
    Switch,
}

/// Presence status as reported by the chat service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Online,
    Looking,
    Busy,
    Dnd,
    Crown,
    Idle,
    Away,
    Offline,
}

impl Status {
    /// Idle, away and offline participants are not considered around.
    pub fn is_active(self) -> bool {
        matches!(
            self,
            Status::Online | Status::Looking | Status::Busy | Status::Dnd | Status::Crown
        )
    }
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub name: String,
    pub role: Role,
    pub status: Status,
}

impl Participant {
    pub fn new(name: impl Into<String>, role: Role, status: Status) -> Self {
        Self { name: name.into(), role, status }
    }

    /// Someone seen talking: unknown role, online.
    pub fn seen(name: impl Into<String>) -> Self {
        Self::new(name, Role::Unknown, Status::Online)
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}
