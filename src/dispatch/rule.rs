//! Rule records held by the [`Registry`](super::Registry).

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use regex::{Regex, RegexBuilder};

use crate::error::{HandlerResult, RegistryError};
use crate::outbox::Outbox;

use super::handler::{
    CommandContext, CommandHandler, JoinContext, JoinHandler, SubscriptionContext,
    SubscriptionHandler,
};

/// Optional allow-list; `None` matches everything.
pub(crate) type AllowSet = Option<HashSet<String>>;

pub(crate) fn allows(set: &AllowSet, value: &str) -> bool {
    match set {
        Some(s) => s.contains(value),
        None => true,
    }
}

fn collect_set<I, S>(items: I) -> AllowSet
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(items.into_iter().map(Into::into).collect())
}

/// A chat command: a trigger pattern plus the filters deciding when it fires.
///
/// Defaults match the common bot command: anchored at the start of the
/// message, case-insensitive, any nickname, any channel, no cooldown.
///
/// ```
/// use std::time::Duration;
/// use slirc_tmi::CommandRule;
///
/// let rule = CommandRule::new("!so", |out, ctx| {
///     if let Some(target) = ctx.args.first().filter(|t| !t.is_empty()) {
///         let _ = out.send_message(ctx.channel, &format!("Go follow {target}!"));
///     }
///     Ok(())
/// })
/// .channels(["#benesim"])
/// .cooldown(Duration::from_secs(10));
/// # let _ = rule;
/// ```
pub struct CommandRule {
    pub(crate) trigger: String,
    pub(crate) handler: Box<dyn CommandHandler>,
    pub(crate) nicknames: AllowSet,
    pub(crate) channels: AllowSet,
    pub(crate) case_sensitive: bool,
    pub(crate) starts_with: bool,
    pub(crate) cooldown: Option<Duration>,
}

impl CommandRule {
    /// Create a rule from a trigger pattern and a handler closure.
    ///
    /// The trigger is a regular expression; escape it with
    /// [`regex::escape`] to match literal text.
    pub fn new<F>(trigger: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(&mut Outbox, &CommandContext<'_>) -> HandlerResult + Send + 'static,
    {
        Self::with_handler(trigger, handler)
    }

    /// Create a rule from any [`CommandHandler`] implementation.
    pub fn with_handler<H>(trigger: impl Into<String>, handler: H) -> Self
    where
        H: CommandHandler + 'static,
    {
        Self {
            trigger: trigger.into(),
            handler: Box::new(handler),
            nicknames: None,
            channels: None,
            case_sensitive: false,
            starts_with: true,
            cooldown: None,
        }
    }

    /// Only fire for these senders.
    pub fn nicknames<I, S>(mut self, nicknames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nicknames = collect_set(nicknames);
        self
    }

    /// Only fire in these channels (names include `#`).
    pub fn channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = collect_set(channels);
        self
    }

    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// `true` (the default) requires the trigger at the start of the
    /// message; `false` lets it appear anywhere.
    pub fn starts_with(mut self, starts_with: bool) -> Self {
        self.starts_with = starts_with;
        self
    }

    /// Minimum time between two firings in the same channel.
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    pub fn trigger(&self) -> &str {
        &self.trigger
    }

    /// Compile the trigger into the pattern used for matching.
    ///
    /// The `args` group captures everything after the trigger. When the
    /// trigger may appear anywhere, the greedy prefix makes the last
    /// occurrence the one that counts.
    pub(crate) fn compile(&self) -> Result<Regex, RegistryError> {
        let source = if self.starts_with {
            format!("^(?:{})(?P<args>.*)", self.trigger)
        } else {
            format!("^.*(?:{})(?P<args>.*)", self.trigger)
        };

        RegexBuilder::new(&source)
            .case_insensitive(!self.case_sensitive)
            .build()
            .map_err(|source| RegistryError::InvalidTrigger {
                trigger: self.trigger.clone(),
                source,
            })
    }
}

impl fmt::Debug for CommandRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandRule")
            .field("trigger", &self.trigger)
            .field("nicknames", &self.nicknames)
            .field("channels", &self.channels)
            .field("case_sensitive", &self.case_sensitive)
            .field("starts_with", &self.starts_with)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

/// A hook fired for every `USERNOTICE` (subscriptions, resubs, gifts...).
pub struct SubscriptionHook {
    pub(crate) handler: Box<dyn SubscriptionHandler>,
    pub(crate) channels: AllowSet,
}

impl SubscriptionHook {
    pub fn new<F>(handler: F) -> Self
    where
        F: FnMut(&mut Outbox, &SubscriptionContext<'_>) -> HandlerResult + Send + 'static,
    {
        Self::with_handler(handler)
    }

    pub fn with_handler<H>(handler: H) -> Self
    where
        H: SubscriptionHandler + 'static,
    {
        Self {
            handler: Box::new(handler),
            channels: None,
        }
    }

    /// Only fire in these channels.
    pub fn channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = collect_set(channels);
        self
    }
}

impl fmt::Debug for SubscriptionHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHook")
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

/// A hook fired when a user joins a channel.
pub struct JoinHook {
    pub(crate) handler: Box<dyn JoinHandler>,
    pub(crate) nicknames: AllowSet,
    pub(crate) channels: AllowSet,
}

impl JoinHook {
    pub fn new<F>(handler: F) -> Self
    where
        F: FnMut(&mut Outbox, &JoinContext<'_>) -> HandlerResult + Send + 'static,
    {
        Self::with_handler(handler)
    }

    pub fn with_handler<H>(handler: H) -> Self
    where
        H: JoinHandler + 'static,
    {
        Self {
            handler: Box::new(handler),
            nicknames: None,
            channels: None,
        }
    }

    /// Only fire for these users.
    pub fn nicknames<I, S>(mut self, nicknames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nicknames = collect_set(nicknames);
        self
    }

    /// Only fire in these channels.
    pub fn channels<I, S>(mut self, channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.channels = collect_set(channels);
        self
    }
}

impl fmt::Debug for JoinHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JoinHook")
            .field("nicknames", &self.nicknames)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}
