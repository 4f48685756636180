//! Per-channel outbound rate limiting.
//!
//! Twitch silences accounts that send more than a fixed number of chat
//! messages per 30 seconds in a channel. Each joined channel keeps the
//! instants of its recent sends; an attempt is allowed only while fewer
//! than `limit` of them fall inside the trailing window. This is a strict
//! sliding-window counter, pruned lazily on each attempt.

use std::collections::{HashMap, VecDeque};
use std::num::NonZeroU32;
use std::time::{Duration, Instant};

/// Length of the sliding window.
pub const WINDOW: Duration = Duration::from_secs(30);

/// Result of a send attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum SendOutcome {
    /// The message was accepted and written (or queued for writing).
    Sent,
    /// The channel's window is full; the message was dropped.
    Suppressed,
    /// The channel is not in the configured channel table; nothing was sent.
    UnknownChannel,
}

impl SendOutcome {
    pub fn is_sent(self) -> bool {
        matches!(self, SendOutcome::Sent)
    }
}

/// Send history of a single channel.
#[derive(Clone, Debug)]
pub struct ChannelState {
    limit: NonZeroU32,
    sent: VecDeque<Instant>,
}

impl ChannelState {
    pub fn new(limit: NonZeroU32) -> Self {
        Self {
            limit,
            sent: VecDeque::with_capacity(limit.get() as usize),
        }
    }

    pub fn limit(&self) -> NonZeroU32 {
        self.limit
    }

    /// Drop timestamps older than the window as seen from `now`.
    ///
    /// A send exactly [`WINDOW`] ago still counts.
    fn prune(&mut self, now: Instant) {
        while let Some(&oldest) = self.sent.front() {
            if now.saturating_duration_since(oldest) > WINDOW {
                self.sent.pop_front();
            } else {
                break;
            }
        }
    }

    /// Sends still counted against the window at `now`.
    pub fn in_window(&mut self, now: Instant) -> usize {
        self.prune(now);
        self.sent.len()
    }

    /// Record a send at `now` if the window allows it.
    pub fn try_acquire(&mut self, now: Instant) -> bool {
        self.prune(now);
        if self.sent.len() < self.limit.get() as usize {
            self.sent.push_back(now);
            true
        } else {
            false
        }
    }
}

/// Rate limiter over the fixed set of configured channels.
#[derive(Clone, Debug, Default)]
pub struct RateLimiter {
    channels: HashMap<String, ChannelState>,
}

impl RateLimiter {
    /// Build a limiter from `(channel, limit)` pairs.
    ///
    /// A channel listed twice keeps the last limit.
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = (S, NonZeroU32)>,
        S: Into<String>,
    {
        Self {
            channels: channels
                .into_iter()
                .map(|(name, limit)| (name.into(), ChannelState::new(limit)))
                .collect(),
        }
    }

    /// Whether `channel` is in the channel table.
    pub fn knows(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }

    /// Names of all configured channels.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn channel(&self, channel: &str) -> Option<&ChannelState> {
        self.channels.get(channel)
    }

    /// Decide whether a message to `channel` may be sent at `now`, and
    /// record it if so.
    pub fn check(&mut self, channel: &str, now: Instant) -> SendOutcome {
        match self.channels.get_mut(channel) {
            None => SendOutcome::UnknownChannel,
            Some(state) => {
                if state.try_acquire(now) {
                    SendOutcome::Sent
                } else {
                    SendOutcome::Suppressed
                }
            }
        }
    }
}
