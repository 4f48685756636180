//! Property-based tests for the rate limiter and the line parser.
//!
//! Verifies that:
//! 1. No 30-second window ever holds more accepted sends than the limit
//! 2. Parsing never panics and always yields some event
//! 3. Well-formed chat lines decode to exactly their components

use std::num::NonZeroU32;
use std::time::{Duration, Instant};

use proptest::prelude::*;
use slirc_tmi::ratelimit::WINDOW;
use slirc_tmi::{Event, RateLimiter};

// =============================================================================
// STRATEGIES
// =============================================================================

/// Gaps between consecutive send attempts, in milliseconds.
fn gaps_strategy() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(prop_oneof![0u64..10, 0u64..2_000, 0u64..40_000], 1..200)
}

fn nickname_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9_]{1,25}").expect("valid regex")
}

fn channel_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("#[a-z0-9_]{1,25}").expect("valid regex")
}

/// Chat text without leading or trailing whitespace.
fn body_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9!?.,:@#]{1,20}( [a-zA-Z0-9!?.,:@#]{1,20}){0,5}")
        .expect("valid regex")
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn sliding_window_never_exceeds_limit(limit in 1u32..10, gaps in gaps_strategy()) {
        let mut limiter = RateLimiter::new([("#c", NonZeroU32::new(limit).unwrap())]);
        let t0 = Instant::now();

        let mut now = t0;
        let mut accepted: Vec<Instant> = Vec::new();
        for gap in gaps {
            now += Duration::from_millis(gap);
            if limiter.check("#c", now).is_sent() {
                accepted.push(now);
            }
        }

        for (i, &end) in accepted.iter().enumerate() {
            let in_window = accepted[..=i]
                .iter()
                .filter(|&&t| end.duration_since(t) <= WINDOW)
                .count();
            prop_assert!(in_window <= limit as usize);
        }
    }

    #[test]
    fn first_attempt_in_an_empty_window_is_accepted(limit in 1u32..10, gap in 30_001u64..100_000) {
        let mut limiter = RateLimiter::new([("#c", NonZeroU32::new(limit).unwrap())]);
        let t0 = Instant::now();
        for _ in 0..limit {
            prop_assert!(limiter.check("#c", t0).is_sent());
        }
        prop_assert!(!limiter.check("#c", t0).is_sent());
        prop_assert!(limiter.check("#c", t0 + Duration::from_millis(gap)).is_sent());
    }

    #[test]
    fn parse_is_total(line in "\\PC*") {
        let event = Event::parse(&line);
        let _ = event.kind();
    }

    #[test]
    fn ping_lines_are_always_ping(rest in "[^\r\n]*") {
        let line = format!("PING{}", rest);
        let is_ping = matches!(Event::parse(&line), Event::Ping { .. });
        prop_assert!(is_ping);
    }

    #[test]
    fn chat_lines_decode_to_their_parts(
        nick in nickname_strategy(),
        channel in channel_strategy(),
        body in body_strategy(),
    ) {
        let line = format!(
            "@display-name={nick} :{nick}!{nick}@{nick}.tmi.twitch.tv PRIVMSG {channel} :{body}"
        );
        match Event::parse(&line) {
            Event::ChatMessage { nickname, channel: c, body: b, tags } => {
                prop_assert_eq!(nickname, nick.as_str());
                prop_assert_eq!(c, channel.as_str());
                prop_assert_eq!(b, body.as_str());
                let tags = tags.expect("tags present");
                prop_assert_eq!(tags.get("display-name"), Some(nick.as_str()));
            }
            other => prop_assert!(false, "expected chat message, got {:?}", other),
        }
    }

    #[test]
    fn mismatched_prefix_is_unrecognized(
        nick in nickname_strategy(),
        other in nickname_strategy(),
        channel in channel_strategy(),
    ) {
        prop_assume!(nick != other);
        let line = format!(":{nick}!{other}@{nick}.tmi.twitch.tv PRIVMSG {channel} :hi");
        prop_assert_eq!(Event::parse(&line), Event::Unrecognized);
    }
}
