//! Typed events decoded from TMI server lines.

use crate::message::{ParsedLine, Tags};

/// A single decoded server line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    /// Keep-alive probe; must be answered with `PONG <server>`.
    Ping {
        /// Everything after `PING `, echoed verbatim in the reply.
        server: &'a str,
    },
    /// A `PRIVMSG` sent to a channel.
    ChatMessage {
        nickname: &'a str,
        channel: &'a str,
        body: &'a str,
        tags: Option<Tags>,
    },
    /// A `USERNOTICE` (subscription, resub, gift, raid...).
    Subscription {
        channel: &'a str,
        body: Option<&'a str>,
        tags: Option<Tags>,
    },
    /// A user joined a channel.
    Join { nickname: &'a str, channel: &'a str },
    /// Anything else. Ignored by the session.
    Unrecognized,
}

impl<'a> Event<'a> {
    /// Decode one line, already stripped of its line terminator.
    ///
    /// `PING` is recognised before any other grammar is tried. Lines
    /// that do not fit the grammar, or whose action has no handler,
    /// decode to [`Event::Unrecognized`].
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();

        if line.starts_with("PING") {
            let server = line.split_once(' ').map(|(_, s)| s).unwrap_or("");
            return Event::Ping { server };
        }

        let Some(parsed) = ParsedLine::parse(line) else {
            return Event::Unrecognized;
        };
        let tags = parsed.tags.map(Tags::parse);

        match parsed.action {
            "PRIVMSG" => match (parsed.nickname, parsed.message) {
                (Some(nickname), Some(body)) => Event::ChatMessage {
                    nickname,
                    channel: parsed.channel,
                    body,
                    tags,
                },
                _ => Event::Unrecognized,
            },
            "USERNOTICE" => Event::Subscription {
                channel: parsed.channel,
                body: parsed.message,
                tags,
            },
            "JOIN" => match parsed.nickname {
                Some(nickname) => Event::Join {
                    nickname,
                    channel: parsed.channel,
                },
                None => Event::Unrecognized,
            },
            _ => Event::Unrecognized,
        }
    }

    /// Short name of the event kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Ping { .. } => "ping",
            Event::ChatMessage { .. } => "chat_message",
            Event::Subscription { .. } => "subscription",
            Event::Join { .. } => "join",
            Event::Unrecognized => "unrecognized",
        }
    }

    /// Channel the event belongs to, if any.
    pub fn channel(&self) -> Option<&'a str> {
        match self {
            Event::ChatMessage { channel, .. }
            | Event::Subscription { channel, .. }
            | Event::Join { channel, .. } => Some(*channel),
            Event::Ping { .. } | Event::Unrecognized => None,
        }
    }
}
