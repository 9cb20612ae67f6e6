//! Bot config loader (strict parsing).

pub mod schema;

use std::fs;

use loth_core::error::{LothError, Result};

pub use schema::{AccountSection, BotConfig, ChatSection, LothSection};

/// Environment variable that overrides `account.password`.
pub const PASSWORD_ENV: &str = "LOTH_PASSWORD";

pub fn load_from_file(path: &str) -> Result<BotConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| LothError::Config(format!("read {path} failed: {e}")))?;
    let mut cfg = parse(&s)?;
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        cfg.account.password = password;
    }
    cfg.validate()?;
    Ok(cfg)
}

pub fn load_from_str(s: &str) -> Result<BotConfig> {
    let cfg = parse(s)?;
    cfg.validate()?;
    Ok(cfg)
}

fn parse(s: &str) -> Result<BotConfig> {
    serde_yaml::from_str(s).map_err(|e| LothError::Config(format!("invalid yaml: {e}")))
}
