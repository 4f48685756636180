//! Benchmarks for TMI line parsing and dispatch.

use std::num::NonZeroU32;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use slirc_tmi::{CommandRule, Event, Outbox, RateLimiter, Registry};

/// Keep-alive probe
const PING: &str = "PING :tmi.twitch.tv";

/// Untagged chat message
const CHAT: &str = ":viewer!viewer@viewer.tmi.twitch.tv PRIVMSG #benesim :!so someone";

/// Chat message with the tags Twitch sends by default
const TAGGED_CHAT: &str = "@badge-info=;badges=broadcaster/1;color=#0D4200;display-name=Viewer;emotes=;first-msg=0;flags=;id=c285c9ed-8b1b-4702-ae1c-c64d76cc74ef;mod=0;room-id=1337;subscriber=0;tmi-sent-ts=1507246572675;turbo=0;user-id=1337;user-type= :viewer!viewer@viewer.tmi.twitch.tv PRIVMSG #benesim :!discord please";

/// Resubscription notice with an escaped system message
const RESUB: &str = "@badge-info=subscriber/8;display-name=Viewer;login=viewer;msg-id=resub;msg-param-cumulative-months=8;msg-param-months=8;system-msg=Viewer\\ssubscribed\\sfor\\s8\\smonths! :tmi.twitch.tv USERNOTICE #benesim :still here";

/// Line that fits no rule
const ROOMSTATE: &str = "@emote-only=0;room-id=1337 :tmi.twitch.tv ROOMSTATE #benesim";

fn benchmark_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("Event Parsing");

    for (name, line) in [
        ("ping", PING),
        ("chat", CHAT),
        ("tagged_chat", TAGGED_CHAT),
        ("resub", RESUB),
        ("unrecognized", ROOMSTATE),
    ] {
        group.bench_with_input(BenchmarkId::new("parse", name), line, |b, s| {
            b.iter(|| black_box(Event::parse(black_box(s))))
        });
    }

    group.finish();
}

fn benchmark_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Dispatch");

    let mut registry = Registry::new();
    for trigger in ["!so", "!discord", "!github", "!uptime", "!lurk"] {
        registry
            .add_command(CommandRule::new(trigger, |_, _| Ok(())))
            .unwrap();
    }
    let limit = NonZeroU32::new(u32::MAX).unwrap();
    let mut out = Outbox::new(RateLimiter::new([("#benesim", limit)]));

    group.bench_function("parse_and_dispatch", |b| {
        b.iter(|| {
            let event = Event::parse(black_box(TAGGED_CHAT));
            black_box(registry.dispatch(&event, &mut out))
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_parsing, benchmark_dispatch);

criterion_main!(benches);
