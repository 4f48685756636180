//! Send-only handle given to command and hook handlers.
//!
//! Handlers never see the transport. They queue chat messages through an
//! [`Outbox`], which applies the per-channel rate limit at the moment of
//! the call; the session writes whatever was accepted once the current
//! dispatch pass is over.

use std::collections::VecDeque;
use std::time::Instant;

use tracing::{debug, warn};

use crate::command::ClientCommand;
use crate::ratelimit::{RateLimiter, SendOutcome};

#[derive(Debug)]
pub struct Outbox {
    limiter: RateLimiter,
    pending: VecDeque<ClientCommand>,
}

impl Outbox {
    pub fn new(limiter: RateLimiter) -> Self {
        Self {
            limiter,
            pending: VecDeque::new(),
        }
    }

    /// Queue `text` for `channel`, subject to the channel's rate limit.
    pub fn send_message(&mut self, channel: &str, text: &str) -> SendOutcome {
        self.send_message_at(channel, text, Instant::now())
    }

    /// Like [`send_message`](Self::send_message) with an explicit clock reading.
    pub fn send_message_at(&mut self, channel: &str, text: &str, now: Instant) -> SendOutcome {
        let outcome = self.limiter.check(channel, now);
        match outcome {
            SendOutcome::Sent => {
                self.pending.push_back(ClientCommand::privmsg(channel, text));
            }
            SendOutcome::Suppressed => {
                debug!(channel, "rate limit reached, message dropped");
            }
            SendOutcome::UnknownChannel => {
                warn!(channel, "channel not joined, message dropped");
            }
        }
        outcome
    }

    /// Queue a command that bypasses rate limiting.
    pub(crate) fn push_unlimited(&mut self, cmd: ClientCommand) {
        self.pending.push_back(cmd);
    }

    /// Take the next queued command, oldest first.
    pub(crate) fn pop(&mut self) -> Option<ClientCommand> {
        self.pending.pop_front()
    }

    /// Commands accepted but not yet written.
    pub fn pending(&self) -> impl Iterator<Item = &ClientCommand> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}
