//! Twitch IRC capabilities.
//!
//! TMI exposes its extensions as IRCv3 capabilities under the
//! `twitch.tv/` vendor namespace. The client requests all three during
//! the handshake without waiting for the `ACK`.
//!
//! # Reference
//! - <https://dev.twitch.tv/docs/chat/irc/#requesting-twitch-specific-capabilities>

/// Known Twitch capability types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `JOIN`/`PART` notifications for other users.
    Membership,
    /// Message tags (badges, display names, sub metadata).
    Tags,
    /// Twitch-specific commands such as `USERNOTICE`.
    Commands,
}

impl Capability {
    /// The capabilities requested during the handshake, in request order.
    pub const HANDSHAKE: [Capability; 3] =
        [Capability::Membership, Capability::Tags, Capability::Commands];

    /// Name sent in `CAP REQ`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Membership => "twitch.tv/membership",
            Self::Tags => "twitch.tv/tags",
            Self::Commands => "twitch.tv/commands",
        }
    }
}

impl AsRef<str> for Capability {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
