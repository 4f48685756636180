//! # slirc-tmi
//!
//! A small async client for Twitch's IRC dialect (TMI).
//!
//! ## Features
//!
//! - Typed parsing of the lines a chat bot cares about: `PING`, `PRIVMSG`,
//!   `USERNOTICE` and `JOIN`, including IRCv3 message tags
//! - Rule-based dispatch of chat commands, subscription hooks and join hooks
//! - Per-channel sliding-window rate limiting of outbound chat
//! - Tokio transport over plain TCP or TLS (`tls` feature, on by default)

#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! ## Quick Start
//!
//! ```no_run
//! use std::num::NonZeroU32;
//! use slirc_tmi::{ChannelLimit, CommandRule, Registry, Session, SessionConfig};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = SessionConfig::new(
//!     "mybot",
//!     "oauth:0123456789abcdef",
//!     [ChannelLimit::new("#benesim", NonZeroU32::new(20).unwrap())],
//! )?;
//!
//! let mut registry = Registry::new();
//! registry.add_command(CommandRule::new("!ping", |out, ctx| {
//!     let _ = out.send_message(ctx.channel, "pong");
//!     Ok(())
//! }))?;
//!
//! let mut session = Session::new(config);
//! session.connect().await?;
//! session.run(&mut registry).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Parsing lines
//!
//! ```rust
//! use slirc_tmi::Event;
//!
//! let raw = "@display-name=Alice :alice!alice@alice.tmi.twitch.tv PRIVMSG #benesim :hello";
//! match Event::parse(raw) {
//!     Event::ChatMessage { nickname, channel, body, tags } => {
//!         assert_eq!(nickname, "alice");
//!         assert_eq!(channel, "#benesim");
//!         assert_eq!(body, "hello");
//!         assert_eq!(tags.unwrap().get("display-name"), Some("Alice"));
//!     }
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```

pub mod caps;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod line;
pub mod message;
pub mod outbox;
pub mod ratelimit;
pub mod session;
pub mod transport;
pub mod util;

pub use self::caps::Capability;
pub use self::command::ClientCommand;
pub use self::config::{ChannelLimit, ServerConfig, SessionConfig};
pub use self::dispatch::{
    CommandContext, CommandHandler, CommandRule, DispatchReport, JoinContext, JoinHandler,
    JoinHook, Registry, SubscriptionContext, SubscriptionHandler, SubscriptionHook,
};
pub use self::error::{
    ConfigError, HandlerResult, ProtocolError, RegistryError, Result, SessionError,
};
pub use self::event::Event;
pub use self::line::LineCodec;
pub use self::message::Tags;
pub use self::outbox::Outbox;
pub use self::ratelimit::{RateLimiter, SendOutcome};
pub use self::session::{Session, SessionState, ShutdownHandle};
pub use self::transport::TransportStream;
