//! Session configuration.
//!
//! A [`SessionConfig`] can be built in code with [`SessionConfig::new`] or
//! loaded from TOML:
//!
//! ```toml
//! username = "mybot"
//! password = "oauth:0123456789abcdef"
//! read_timeout_secs = 360
//!
//! [[channels]]
//! name = "#benesim"
//! limit = 20
//!
//! [server]
//! host = "irc.chat.twitch.tv"
//! port = 6697
//! tls = true
//! ```

use std::fmt;
use std::num::NonZeroU32;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default TMI host.
pub const DEFAULT_HOST: &str = "irc.chat.twitch.tv";
/// Default plaintext port.
pub const DEFAULT_PORT: u16 = 6667;

/// Where to connect.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Wrap the connection in TLS. Requires the `tls` feature.
    pub tls: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            tls: false,
        }
    }
}

/// A channel to join and its outbound message limit per 30 seconds.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct ChannelLimit {
    pub name: String,
    pub limit: NonZeroU32,
}

impl ChannelLimit {
    pub fn new(name: impl Into<String>, limit: NonZeroU32) -> Self {
        Self {
            name: name.into(),
            limit,
        }
    }
}

#[derive(Deserialize)]
struct RawConfig {
    username: String,
    password: String,
    #[serde(default)]
    channels: Vec<ChannelLimit>,
    #[serde(default)]
    server: ServerConfig,
    read_timeout_secs: Option<u64>,
}

/// Everything a [`Session`](crate::Session) needs to connect.
#[derive(Clone)]
pub struct SessionConfig {
    pub username: String,
    /// Auth token, usually `oauth:...`.
    pub password: String,
    pub channels: Vec<ChannelLimit>,
    pub server: ServerConfig,
    /// End the run loop if no complete line arrives within this long.
    pub read_timeout: Option<Duration>,
}

impl SessionConfig {
    /// Build and validate a configuration.
    pub fn new<I>(
        username: impl Into<String>,
        password: impl Into<String>,
        channels: I,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = ChannelLimit>,
    {
        Self {
            username: username.into(),
            password: password.into(),
            channels: channels.into_iter().collect(),
            server: ServerConfig::default(),
            read_timeout: None,
        }
        .validated()
    }

    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = server;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(s)?;
        Self {
            username: raw.username,
            password: raw.password,
            channels: raw.channels,
            server: raw.server,
            read_timeout: raw.read_timeout_secs.map(Duration::from_secs),
        }
        .validated()
    }

    /// Read a TOML file from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// `(channel, limit)` pairs in configuration order.
    pub fn channel_limits(&self) -> impl Iterator<Item = (&str, NonZeroU32)> {
        self.channels.iter().map(|c| (c.name.as_str(), c.limit))
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if self.username.trim().is_empty() {
            return Err(ConfigError::Invalid("username must not be empty".into()));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Invalid("password must not be empty".into()));
        }
        if self.read_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid("read timeout must be positive".into()));
        }

        let mut channels: Vec<ChannelLimit> = Vec::with_capacity(self.channels.len());
        for mut channel in self.channels {
            let bare = channel.name.trim().trim_start_matches('#');
            if bare.is_empty() || bare.contains(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "invalid channel name {:?}",
                    channel.name
                )));
            }
            channel.name = format!("#{}", bare);

            match channels.iter_mut().find(|c| c.name == channel.name) {
                Some(existing) => existing.limit = channel.limit,
                None => channels.push(channel),
            }
        }
        self.channels = channels;

        Ok(self)
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("channels", &self.channels)
            .field("server", &self.server)
            .field("read_timeout", &self.read_timeout)
            .finish()
    }
}
