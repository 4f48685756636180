//! Outbound client command types.
//!
//! # Reference
//! - <https://dev.twitch.tv/docs/chat/irc/>

use crate::caps::Capability;
use crate::util::{first_line, sanitize_chat_text};

/// A command the client writes to the server.
///
/// [`Display`](std::fmt::Display) yields the wire form without the
/// trailing CRLF; [`LineCodec`](crate::line::LineCodec) appends it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ClientCommand {
    /// `PASS oauth:token`
    Pass(String),
    /// `NICK username`
    Nick(String),
    /// `CAP REQ :capability`
    CapReq(Capability),
    /// `JOIN #channel`
    Join(String),
    /// `PART #channel`
    Part(String),
    /// `PONG server`, with the server token echoed verbatim.
    Pong(String),
    /// `PRIVMSG #channel :text`
    Privmsg {
        /// Target channel, including `#`.
        channel: String,
        /// Message text.
        text: String,
    },
}

impl ClientCommand {
    /// Build a `PRIVMSG`, keeping only the first line of `text` and
    /// capping it at the platform's message length.
    pub fn privmsg(channel: &str, text: &str) -> Self {
        Self::Privmsg {
            channel: first_line(channel).to_string(),
            text: sanitize_chat_text(text).to_string(),
        }
    }

    /// Build a `PONG` echoing the token received in `PING`.
    pub fn pong(server: &str) -> Self {
        Self::Pong(first_line(server).to_string())
    }

    /// The command verb.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pass(_) => "PASS",
            Self::Nick(_) => "NICK",
            Self::CapReq(_) => "CAP",
            Self::Join(_) => "JOIN",
            Self::Part(_) => "PART",
            Self::Pong(_) => "PONG",
            Self::Privmsg { .. } => "PRIVMSG",
        }
    }

    /// Whether the command carries a credential and must not be logged.
    pub fn is_sensitive(&self) -> bool {
        matches!(self, Self::Pass(_))
    }
}
