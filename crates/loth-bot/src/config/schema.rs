use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use loth_core::error::{LothError, Result};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    pub version: u32,

    #[serde(default)]
    pub chat: ChatSection,

    pub account: AccountSection,

    #[serde(default)]
    pub channels: Vec<String>,

    #[serde(default)]
    pub loth: LothSection,
}

impl BotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LothError::Config(format!("unsupported version {}", self.version)));
        }
        self.chat.validate()?;
        self.account.validate()?;
        self.loth.validate()?;

        if self.channels.iter().any(|c| c.trim().is_empty()) {
            return Err(LothError::Config("channels must not contain empty names".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChatSection {
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default = "default_ticket_url")]
    pub ticket_url: String,

    #[serde(default = "default_client_name")]
    pub client_name: String,

    #[serde(default = "default_client_version")]
    pub client_version: String,

    #[serde(default = "default_buffer")]
    pub frame_buffer: usize,

    #[serde(default = "default_buffer")]
    pub message_buffer: usize,

    #[serde(default = "default_disconnect_timeout_ms")]
    pub disconnect_timeout_ms: u64,

    #[serde(default = "default_ticket_timeout_ms")]
    pub ticket_timeout_ms: u64,
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            url: default_url(),
            ticket_url: default_ticket_url(),
            client_name: default_client_name(),
            client_version: default_client_version(),
            frame_buffer: default_buffer(),
            message_buffer: default_buffer(),
            disconnect_timeout_ms: default_disconnect_timeout_ms(),
            ticket_timeout_ms: default_ticket_timeout_ms(),
        }
    }
}

impl ChatSection {
    pub fn validate(&self) -> Result<()> {
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(LothError::Config("chat.url must be a ws:// or wss:// url".into()));
        }
        if !(self.ticket_url.starts_with("http://") || self.ticket_url.starts_with("https://")) {
            return Err(LothError::Config("chat.ticket_url must be an http(s) url".into()));
        }
        if !(1..=10000).contains(&self.frame_buffer) {
            return Err(LothError::Config("chat.frame_buffer must be between 1 and 10000".into()));
        }
        if !(1..=10000).contains(&self.message_buffer) {
            return Err(LothError::Config("chat.message_buffer must be between 1 and 10000".into()));
        }
        if !(100..=30000).contains(&self.disconnect_timeout_ms) {
            return Err(LothError::Config(
                "chat.disconnect_timeout_ms must be between 100 and 30000".into(),
            ));
        }
        if !(1000..=60000).contains(&self.ticket_timeout_ms) {
            return Err(LothError::Config(
                "chat.ticket_timeout_ms must be between 1000 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn disconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.disconnect_timeout_ms)
    }

    pub fn ticket_timeout(&self) -> Duration {
        Duration::from_millis(self.ticket_timeout_ms)
    }
}

fn default_url() -> String {
    "wss://chat.f-list.net/chat2".into()
}
fn default_ticket_url() -> String {
    "https://www.f-list.net/json/getApiTicket.php".into()
}
fn default_client_name() -> String {
    "loth".into()
}
fn default_client_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}
fn default_buffer() -> usize {
    100
}
fn default_disconnect_timeout_ms() -> u64 {
    2000
}
fn default_ticket_timeout_ms() -> u64 {
    10000
}

/// Login credentials. `Debug` never prints the password.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountSection {
    pub account: String,
    pub password: String,
    pub character: String,
}

impl AccountSection {
    pub fn validate(&self) -> Result<()> {
        if self.account.is_empty() || self.password.is_empty() || self.character.is_empty() {
            return Err(LothError::Config(
                "account.account, account.password and account.character are required".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for AccountSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountSection")
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .field("character", &self.character)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LothSection {
    #[serde(default = "default_loth_duration_secs")]
    pub duration_secs: u64,

    #[serde(default = "default_loth_command")]
    pub command: String,
}

impl Default for LothSection {
    fn default() -> Self {
        Self {
            duration_secs: default_loth_duration_secs(),
            command: default_loth_command(),
        }
    }
}

impl LothSection {
    pub fn validate(&self) -> Result<()> {
        if !(60..=86400).contains(&self.duration_secs) {
            return Err(LothError::Config("loth.duration_secs must be between 60 and 86400".into()));
        }
        if self.command.trim().is_empty() {
            return Err(LothError::Config("loth.command must not be empty".into()));
        }
        Ok(())
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

fn default_loth_duration_secs() -> u64 {
    3600
}
fn default_loth_command() -> String {
    "!loth".into()
}
