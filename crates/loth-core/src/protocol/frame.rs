//! Raw frame parsing (panic-free).
//!
//! Parsing rules:
//! - Never index (`buf[0]`) — always use `get`/`split_at_checked`-style access.
//! - Never `unwrap()` / `expect()` / `panic!()` in production paths.

use bytes::{BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{LothError, Result};

/// Length of the command tag.
pub const TAG_LEN: usize = 3;

/// Separator between tag and body.
pub const SEPARATOR: u8 = b' ';

/// One protocol unit as read from or written to the socket.
///
/// Cloning is cheap (`Bytes` is reference counted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame(Bytes);

impl Frame {
    /// Wrap raw bytes without validation; use [`Frame::split`] to inspect.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self(bytes.into())
    }

    /// Encode `tag` alone when `body` is `None`, else `tag + " " + json(body)`.
    pub fn encode<T: Serialize + ?Sized>(tag: &str, body: Option<&T>) -> Result<Self> {
        if !is_tag(tag.as_bytes()) {
            return Err(LothError::Encode(format!("invalid tag: {tag:?}")));
        }
        let Some(body) = body else {
            return Ok(Self(Bytes::copy_from_slice(tag.as_bytes())));
        };

        let json = serde_json::to_vec(body)
            .map_err(|e| LothError::Encode(format!("{tag} body: {e}")))?;
        let mut buf = BytesMut::with_capacity(TAG_LEN + 1 + json.len());
        buf.put_slice(tag.as_bytes());
        buf.put_u8(SEPARATOR);
        buf.put_slice(&json);
        Ok(Self(buf.freeze()))
    }

    /// Split into `(tag, remainder)`. The remainder still carries the separator.
    pub fn split(&self) -> Result<(&str, &[u8])> {
        let head = self
            .0
            .get(..TAG_LEN)
            .ok_or_else(|| LothError::Malformed(format!("frame too short ({} bytes)", self.0.len())))?;
        if !is_tag(head) {
            return Err(LothError::Malformed("tag must be 3 ASCII letters".into()));
        }
        let tag = std::str::from_utf8(head)
            .map_err(|e| LothError::Malformed(format!("tag utf8: {e}")))?;
        let rest = self.0.get(TAG_LEN..).unwrap_or_default();
        Ok((tag, rest))
    }

    /// Command tag.
    pub fn tag(&self) -> Result<&str> {
        self.split().map(|(tag, _)| tag)
    }

    /// Whether the frame carries anything after its tag.
    pub fn has_body(&self) -> bool {
        self.0.len() > TAG_LEN
    }

    /// Parse the body as JSON, skipping exactly the tag plus one separator byte.
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T> {
        let (tag, rest) = self.split()?;
        let body = match rest.split_first() {
            Some((&SEPARATOR, body)) => body,
            Some(_) => {
                return Err(LothError::Malformed(format!("{tag}: missing separator")));
            }
            None => return Err(LothError::Malformed(format!("{tag}: missing body"))),
        };
        serde_json::from_slice(body).map_err(|e| LothError::Malformed(format!("{tag} body: {e}")))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Bytes {
        self.0
    }

    /// Frame as text (the socket carries UTF-8 text messages).
    pub fn to_text(&self) -> Result<String> {
        String::from_utf8(self.0.to_vec())
            .map_err(|e| LothError::Malformed(format!("frame is not utf8: {e}")))
    }
}

fn is_tag(b: &[u8]) -> bool {
    b.len() == TAG_LEN && b.iter().all(u8::is_ascii_alphabetic)
}
