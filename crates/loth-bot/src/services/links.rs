//! Link extraction from chat text.

use regex::Regex;

use loth_core::error::{LothError, Result};

// stops at whitespace, BBCode brackets, quotes and angle brackets
const URL_PATTERN: &str = r#"(?i)\bhttps?://[^\s\[\]<>"']+"#;

/// Finds `http`/`https` URLs in chat text.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    re: Regex,
}

impl LinkExtractor {
    pub fn new() -> Result<Self> {
        let re = Regex::new(URL_PATTERN)
            .map_err(|e| LothError::Internal(format!("url pattern: {e}")))?;
        Ok(Self { re })
    }

    /// URLs in order of first appearance, each once.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for m in self.re.find_iter(text) {
            let url = m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
            let has_host = url.split_once("://").is_some_and(|(_, rest)| !rest.is_empty());
            if has_host && !out.iter().any(|u| u == url) {
                out.push(url.to_string());
            }
        }
        out
    }
}
