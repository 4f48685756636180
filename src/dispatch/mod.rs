//! Rule-based dispatch of decoded events to user handlers.
//!
//! The [`Registry`] keeps three ordered lists: commands (matched against
//! chat messages), subscription hooks, and join hooks. For each event
//! every rule of the matching list is evaluated in registration order;
//! rules are independent, so one message can fire any number of them.
//!
//! A handler returning `Err` is logged and skipped. The remaining rules
//! of the pass still run and the session keeps going.

mod handler;
mod rule;

use std::collections::HashMap;
use std::time::Instant;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::RegistryError;
use crate::event::Event;
use crate::message::Tags;
use crate::outbox::Outbox;

pub use self::handler::{
    CommandContext, CommandHandler, JoinContext, JoinHandler, SubscriptionContext,
    SubscriptionHandler,
};
pub use self::rule::{CommandRule, JoinHook, SubscriptionHook};

use self::rule::allows;

/// Tally of one dispatch pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Handlers that ran and returned `Ok`.
    pub fired: usize,
    /// Handlers that ran and returned `Err`.
    pub failed: usize,
}

impl DispatchReport {
    /// Handlers invoked, successful or not.
    pub fn invoked(&self) -> usize {
        self.fired + self.failed
    }
}

struct RegisteredCommand {
    rule: CommandRule,
    pattern: Regex,
    last_fired: HashMap<String, Instant>,
}

/// Ordered rule tables.
///
/// Registration is expected to finish before the session starts running;
/// the registry is borrowed mutably by [`Session::run`](crate::Session::run).
#[derive(Default)]
pub struct Registry {
    commands: Vec<RegisteredCommand>,
    subscription_hooks: Vec<SubscriptionHook>,
    join_hooks: Vec<JoinHook>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command rule, compiling its trigger.
    pub fn add_command(&mut self, rule: CommandRule) -> Result<(), RegistryError> {
        let pattern = rule.compile()?;
        self.commands.push(RegisteredCommand {
            rule,
            pattern,
            last_fired: HashMap::new(),
        });
        Ok(())
    }

    pub fn add_subscription_hook(&mut self, hook: SubscriptionHook) {
        self.subscription_hooks.push(hook);
    }

    pub fn add_join_hook(&mut self, hook: JoinHook) {
        self.join_hooks.push(hook);
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn subscription_hook_count(&self) -> usize {
        self.subscription_hooks.len()
    }

    pub fn join_hook_count(&self) -> usize {
        self.join_hooks.len()
    }

    /// Route an event to the matching rules.
    pub fn dispatch(&mut self, event: &Event<'_>, out: &mut Outbox) -> DispatchReport {
        self.dispatch_at(event, out, Instant::now())
    }

    /// Like [`dispatch`](Self::dispatch) with an explicit clock reading,
    /// used for cooldown bookkeeping.
    pub fn dispatch_at(
        &mut self,
        event: &Event<'_>,
        out: &mut Outbox,
        now: Instant,
    ) -> DispatchReport {
        match event {
            Event::ChatMessage {
                nickname,
                channel,
                body,
                tags,
            } => self.on_message(out, nickname, channel, body, tags.as_ref(), now),
            Event::Subscription {
                channel,
                body,
                tags,
            } => self.on_subscription(out, channel, *body, tags.as_ref()),
            Event::Join { nickname, channel } => self.on_join(out, nickname, channel),
            Event::Ping { .. } | Event::Unrecognized => DispatchReport::default(),
        }
    }

    fn on_message(
        &mut self,
        out: &mut Outbox,
        nickname: &str,
        channel: &str,
        message: &str,
        tags: Option<&Tags>,
        now: Instant,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();

        for command in &mut self.commands {
            let rule = &mut command.rule;
            if !allows(&rule.nicknames, nickname) || !allows(&rule.channels, channel) {
                continue;
            }
            if let (Some(cooldown), Some(&last)) =
                (rule.cooldown, command.last_fired.get(channel))
            {
                if now.saturating_duration_since(last) < cooldown {
                    continue;
                }
            }

            let Some(captures) = command.pattern.captures(message) else {
                continue;
            };
            let rest = captures.name("args").map_or("", |m| m.as_str());
            let args = split_args(rest);
            let ctx = CommandContext {
                nickname,
                channel,
                args: &args,
                message,
                tags,
            };

            match rule.handler.call(out, &ctx) {
                Ok(()) => {
                    report.fired += 1;
                    debug!(trigger = %rule.trigger, nickname, channel, "command fired");
                }
                Err(error) => {
                    report.failed += 1;
                    warn!(
                        trigger = %rule.trigger,
                        nickname,
                        channel,
                        error = %error,
                        "command handler failed"
                    );
                }
            }
            command.last_fired.insert(channel.to_string(), now);
        }

        report
    }

    fn on_subscription(
        &mut self,
        out: &mut Outbox,
        channel: &str,
        message: Option<&str>,
        tags: Option<&Tags>,
    ) -> DispatchReport {
        let mut report = DispatchReport::default();
        let ctx = SubscriptionContext {
            channel,
            message,
            tags,
        };

        for hook in &mut self.subscription_hooks {
            if !allows(&hook.channels, channel) {
                continue;
            }
            match hook.handler.call(out, &ctx) {
                Ok(()) => report.fired += 1,
                Err(error) => {
                    report.failed += 1;
                    warn!(channel, error = %error, "subscription hook failed");
                }
            }
        }

        report
    }

    fn on_join(&mut self, out: &mut Outbox, nickname: &str, channel: &str) -> DispatchReport {
        let mut report = DispatchReport::default();
        let ctx = JoinContext { nickname, channel };

        for hook in &mut self.join_hooks {
            if !allows(&hook.nicknames, nickname) || !allows(&hook.channels, channel) {
                continue;
            }
            match hook.handler.call(out, &ctx) {
                Ok(()) => report.fired += 1,
                Err(error) => {
                    report.failed += 1;
                    warn!(nickname, channel, error = %error, "join hook failed");
                }
            }
        }

        report
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field(
                "commands",
                &self.commands.iter().map(|c| &c.rule).collect::<Vec<_>>(),
            )
            .field("subscription_hooks", &self.subscription_hooks)
            .field("join_hooks", &self.join_hooks)
            .finish()
    }
}

/// Split the text after a trigger into arguments.
///
/// Surrounding whitespace is trimmed and the rest is split on single
/// spaces, so two consecutive spaces yield an empty argument and nothing
/// after the trigger yields a single empty argument.
fn split_args(rest: &str) -> Vec<&str> {
    rest.trim().split(' ').collect()
}
