use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use loth_core::error::{LothError, Result};

use crate::config::AccountSection;

/// Account credentials used for ticketing and identify.
#[derive(Clone)]
pub struct Credentials {
    pub account: String,
    pub password: String,
    pub character: String,
}

impl From<&AccountSection> for Credentials {
    fn from(a: &AccountSection) -> Self {
        Self {
            account: a.account.clone(),
            password: a.password.clone(),
            character: a.character.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account", &self.account)
            .field("character", &self.character)
            .finish_non_exhaustive()
    }
}

/// Issues one-time login tickets.
#[async_trait]
pub trait TicketSource: Send + Sync {
    async fn acquire(&self, creds: &Credentials) -> Result<String>;
}

/// Ticket endpoint response. A non-empty `error` means failure.
#[derive(Debug, Default, Deserialize)]
pub struct TicketResponse {
    #[serde(default)]
    pub ticket: String,
    #[serde(default)]
    pub error: String,
}

impl TicketResponse {
    pub fn into_ticket(self) -> Result<String> {
        if !self.error.is_empty() {
            return Err(LothError::Ticket(self.error));
        }
        if self.ticket.is_empty() {
            return Err(LothError::Ticket("response carried no ticket".into()));
        }
        Ok(self.ticket)
    }
}

/// Form-encoded POST against the account ticket endpoint.
pub struct HttpTicketSource {
    client: reqwest::Client,
    url: String,
}

impl HttpTicketSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LothError::Internal(format!("http client: {e}")))?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl TicketSource for HttpTicketSource {
    async fn acquire(&self, creds: &Credentials) -> Result<String> {
        let form = [
            ("account", creds.account.as_str()),
            ("password", creds.password.as_str()),
            ("no_characters", "true"),
            ("no_friends", "true"),
            ("no_bookmarks", "true"),
        ];

        let resp: TicketResponse = self
            .client
            .post(&self.url)
            .form(&form)
            .send()
            .await
            .map_err(|e| LothError::Ticket(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| LothError::Ticket(format!("bad status: {e}")))?
            .json()
            .await
            .map_err(|e| LothError::Ticket(format!("invalid response: {e}")))?;

        let ticket = resp.into_ticket()?;
        tracing::debug!(account = %creds.account, "ticket acquired");
        Ok(ticket)
    }
}

/// Hands out a fixed ticket (tests, local servers).
pub struct StaticTicketSource {
    ticket: String,
}

impl StaticTicketSource {
    pub fn new(ticket: impl Into<String>) -> Self {
        Self { ticket: ticket.into() }
    }
}

#[async_trait]
impl TicketSource for StaticTicketSource {
    async fn acquire(&self, _creds: &Credentials) -> Result<String> {
        Ok(self.ticket.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<String> {
        serde_json::from_str::<TicketResponse>(s).unwrap().into_ticket()
    }

    #[test]
    fn ticket_ok() {
        assert_eq!(parse(r#"{"ticket":"t","error":""}"#).unwrap(), "t");
    }

    #[test]
    fn error_string_is_fatal() {
        let err = parse(r#"{"ticket":"","error":"Login failed."}"#).unwrap_err();
        assert_eq!(err.code().as_str(), "TICKET");
        assert!(err.to_string().contains("Login failed."));
    }

    #[test]
    fn error_wins_over_ticket() {
        assert!(parse(r#"{"ticket":"t","error":"nope"}"#).is_err());
    }

    #[test]
    fn missing_ticket_is_an_error() {
        assert!(parse(r#"{"error":""}"#).is_err());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let c = Credentials {
            account: "a".into(),
            password: "hunter2".into(),
            character: "c".into(),
        };
        assert!(!format!("{c:?}").contains("hunter2"));
    }
}
