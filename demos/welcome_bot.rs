//! A small channel bot.
//!
//! Usage: `cargo run --example welcome_bot -- [bot.toml]`
//!
//! Answers two chat commands, welcomes new and returning subscribers, and
//! greets a couple of regulars when they join. Ctrl-C disconnects.

use std::time::Duration;

use anyhow::Context;
use slirc_tmi::{
    CommandRule, JoinHook, Outbox, Registry, Session, SessionConfig, SubscriptionContext,
    SubscriptionHook,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const REGULARS: [&str; 2] = ["benesim", "beneflight"];

fn welcome_subscriber(out: &mut Outbox, ctx: &SubscriptionContext<'_>) -> slirc_tmi::HandlerResult {
    let tags = ctx.tags.context("USERNOTICE without tags")?;
    let name = tags
        .non_empty("display-name")
        .or_else(|| tags.non_empty("login"))
        .context("subscriber has neither display-name nor login")?;
    let message = ctx.message.filter(|m| !m.is_empty());

    let text = if tags.get("msg-id") == Some("resub") {
        let months = tags.non_empty("msg-param-months").unwrap_or("several");
        match message {
            Some(m) => format!(
                "Welcome back {} for {} months in a row with the message: \"{}\"!",
                name, months, m
            ),
            None => format!("Welcome back {} for {} months in a row!", name, months),
        }
    } else {
        match message {
            Some(m) => format!("Welcome {} with the message: \"{}\"!", name, m),
            None => format!("Welcome {}!", name),
        }
    };

    let _ = out.send_message(ctx.channel, &text);
    Ok(())
}

fn registry() -> anyhow::Result<Registry> {
    let mut registry = Registry::new();

    // Anywhere in a message, at most every 10s per channel.
    registry.add_command(
        CommandRule::new("benesim", |out, ctx| {
            let _ = out.send_message(ctx.channel, "BeneSim is awesome Kappa!");
            Ok(())
        })
        .starts_with(false)
        .cooldown(Duration::from_secs(10)),
    )?;

    registry.add_command(
        CommandRule::new("children", |out, ctx| {
            let _ = out.send_message(ctx.channel, "Save the Children is even more awesome!");
            Ok(())
        })
        .nicknames(["benesim"])
        .channels(["#foo", "#bar"]),
    )?;

    registry.add_subscription_hook(SubscriptionHook::new(welcome_subscriber));

    registry.add_join_hook(
        JoinHook::new(|out, ctx| {
            if REGULARS.contains(&ctx.nickname) {
                let _ = out.send_message(ctx.channel, &format!("Welcome {}", ctx.nickname));
            }
            Ok(())
        })
        .channels(["#benesim"]),
    );

    Ok(registry)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let path = std::env::args().nth(1).unwrap_or_else(|| "bot.toml".to_string());
    let config = SessionConfig::load(&path).with_context(|| format!("loading {}", path))?;
    let mut registry = registry()?;

    let mut session = Session::new(config);
    let shutdown = session.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received, disconnecting");
            shutdown.shutdown();
        }
    });

    session.connect().await?;
    if let Err(e) = session.run(&mut registry).await {
        error!(error = %e, "session ended with an error");
        return Err(e.into());
    }
    Ok(())
}
