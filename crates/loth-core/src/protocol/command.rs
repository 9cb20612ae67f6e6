//! Typed commands.
//!
//! Inbound frames are classified into exactly one [`Command`]. Outbound-only
//! bodies (`JCH`, outbound `MSG`) have their own structs since their shape
//! differs from anything the server sends back.

use serde::{Deserialize, Serialize};

use crate::error::{LothError, Result};
use crate::protocol::frame::Frame;

/// Keep-alive, bidirectional, no payload.
pub const TAG_PING: &str = "PIN";
/// Identify (outbound) and its acknowledgement (inbound).
pub const TAG_IDENTIFY: &str = "IDN";
/// Channel chat message.
pub const TAG_MESSAGE: &str = "MSG";
/// Join channel (outbound only).
pub const TAG_JOIN: &str = "JCH";

/// Identify body. The server's acknowledgement only carries `character`;
/// the remaining fields default to empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identify {
    #[serde(default = "ticket_method")]
    pub method: String,
    #[serde(default)]
    pub account: String,
    #[serde(default)]
    pub ticket: String,
    pub character: String,
    #[serde(default)]
    pub cname: String,
    #[serde(default)]
    pub cversion: String,
}

fn ticket_method() -> String {
    "ticket".into()
}

impl Identify {
    pub fn new(
        account: impl Into<String>,
        ticket: impl Into<String>,
        character: impl Into<String>,
        cname: impl Into<String>,
        cversion: impl Into<String>,
    ) -> Self {
        Self {
            method: ticket_method(),
            account: account.into(),
            ticket: ticket.into(),
            character: character.into(),
            cname: cname.into(),
            cversion: cversion.into(),
        }
    }
}

/// Inbound channel message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub character: String,
    pub message: String,
    pub channel: String,
}

/// Outbound join request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinChannel {
    pub channel: String,
}

impl JoinChannel {
    pub fn frame(&self) -> Result<Frame> {
        Frame::encode(TAG_JOIN, Some(self))
    }
}

/// Outbound channel message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendMessage {
    pub channel: String,
    pub message: String,
}

impl SendMessage {
    pub fn frame(&self) -> Result<Frame> {
        Frame::encode(TAG_MESSAGE, Some(self))
    }
}

/// A decoded command. Immutable once decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Ping,
    Identify(Identify),
    ChatMessage(ChatMessage),
    /// Well-formed frame whose tag this client does not handle.
    Unknown(Frame),
}

impl Command {
    /// Strict decode. Unrecognized tags fail with [`LothError::UnknownCommand`].
    pub fn decode(frame: &Frame) -> Result<Self> {
        match frame.tag()? {
            TAG_PING => Ok(Command::Ping),
            TAG_IDENTIFY => frame.decode_body().map(Command::Identify),
            TAG_MESSAGE => frame.decode_body().map(Command::ChatMessage),
            other => Err(LothError::UnknownCommand(other.to_string())),
        }
    }

    /// Like [`Command::decode`], but folds `UnknownCommand` into
    /// [`Command::Unknown`] so only real decode failures remain errors.
    pub fn classify(frame: &Frame) -> Result<Self> {
        match Self::decode(frame) {
            Err(e) if e.is_unknown_command() => Ok(Command::Unknown(frame.clone())),
            res => res,
        }
    }

    /// Wire tag of this command.
    pub fn tag(&self) -> Result<&str> {
        match self {
            Command::Ping => Ok(TAG_PING),
            Command::Identify(_) => Ok(TAG_IDENTIFY),
            Command::ChatMessage(_) => Ok(TAG_MESSAGE),
            Command::Unknown(frame) => frame.tag(),
        }
    }

    /// Encode for sending. `Unknown` frames are passed through untouched.
    pub fn encode(&self) -> Result<Frame> {
        match self {
            Command::Ping => Frame::encode::<()>(TAG_PING, None),
            Command::Identify(body) => Frame::encode(TAG_IDENTIFY, Some(body)),
            Command::ChatMessage(body) => Frame::encode(TAG_MESSAGE, Some(body)),
            Command::Unknown(frame) => Ok(frame.clone()),
        }
    }
}
