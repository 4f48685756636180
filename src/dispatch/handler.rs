//! Handler capability traits and the arguments they receive.
//!
//! Every handler takes the session's [`Outbox`] (its only way to talk
//! back) plus a context describing the triggering event. Closures with
//! the matching signature implement the traits automatically.

use crate::error::HandlerResult;
use crate::message::Tags;
use crate::outbox::Outbox;

/// Arguments passed to a command handler.
#[derive(Clone, Copy, Debug)]
pub struct CommandContext<'a> {
    /// Sender of the message.
    pub nickname: &'a str,
    /// Channel the message was sent to.
    pub channel: &'a str,
    /// Words following the trigger, split on single spaces.
    ///
    /// Never empty: a bare trigger yields `[""]`.
    pub args: &'a [&'a str],
    /// The full message text.
    pub message: &'a str,
    pub tags: Option<&'a Tags>,
}

/// Arguments passed to a subscription hook.
#[derive(Clone, Copy, Debug)]
pub struct SubscriptionContext<'a> {
    pub channel: &'a str,
    /// The subscriber's message, if they attached one.
    pub message: Option<&'a str>,
    pub tags: Option<&'a Tags>,
}

/// Arguments passed to a join hook.
#[derive(Clone, Copy, Debug)]
pub struct JoinContext<'a> {
    pub nickname: &'a str,
    pub channel: &'a str,
}

pub trait CommandHandler: Send {
    fn call(&mut self, out: &mut Outbox, ctx: &CommandContext<'_>) -> HandlerResult;
}

impl<F> CommandHandler for F
where
    F: FnMut(&mut Outbox, &CommandContext<'_>) -> HandlerResult + Send,
{
    fn call(&mut self, out: &mut Outbox, ctx: &CommandContext<'_>) -> HandlerResult {
        self(out, ctx)
    }
}

pub trait SubscriptionHandler: Send {
    fn call(&mut self, out: &mut Outbox, ctx: &SubscriptionContext<'_>) -> HandlerResult;
}

impl<F> SubscriptionHandler for F
where
    F: FnMut(&mut Outbox, &SubscriptionContext<'_>) -> HandlerResult + Send,
{
    fn call(&mut self, out: &mut Outbox, ctx: &SubscriptionContext<'_>) -> HandlerResult {
        self(out, ctx)
    }
}

pub trait JoinHandler: Send {
    fn call(&mut self, out: &mut Outbox, ctx: &JoinContext<'_>) -> HandlerResult;
}

impl<F> JoinHandler for F
where
    F: FnMut(&mut Outbox, &JoinContext<'_>) -> HandlerResult + Send,
{
    fn call(&mut self, out: &mut Outbox, ctx: &JoinContext<'_>) -> HandlerResult {
        self(out, ctx)
    }
}
