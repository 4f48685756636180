//! Connection lifecycle and the receive loop.
//!
//! A [`Session`] moves through
//! `Disconnected → Connecting → Ready → Running → Closed`:
//!
//! - [`connect`](Session::connect) (or [`attach`](Session::attach) with a
//!   caller-supplied stream) sends the handshake: `PASS`, `NICK`, the
//!   three capability requests, then a `JOIN` per configured channel.
//!   Nothing is awaited from the server in between.
//! - [`run`](Session::run) reads lines until the server hangs up, the
//!   [`ShutdownHandle`] fires, or the read timeout expires. `PING` is
//!   answered directly; every other event goes to the [`Registry`].
//! - [`close`](Session::close) shuts the transport down once; later calls
//!   do nothing.

use std::fmt;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::caps::Capability;
use crate::command::ClientCommand;
use crate::config::SessionConfig;
use crate::dispatch::Registry;
use crate::error::{ProtocolError, Result, SessionError};
use crate::event::Event;
use crate::line::LineCodec;
use crate::outbox::Outbox;
use crate::ratelimit::{RateLimiter, SendOutcome};
use crate::transport::TransportStream;

/// Lifecycle position of a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Ready,
    Running,
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Disconnected => "disconnected",
            SessionState::Connecting => "connecting",
            SessionState::Ready => "ready",
            SessionState::Running => "running",
            SessionState::Closed => "closed",
        })
    }
}

/// Stops a running session from another task.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    token: CancellationToken,
}

impl ShutdownHandle {
    /// Ask the session to stop. The current line finishes first.
    pub fn shutdown(&self) {
        self.token.cancel();
    }

    pub fn is_shutdown(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A single connection to the chat server.
pub struct Session<S = TransportStream> {
    config: SessionConfig,
    framed: Option<Framed<S, LineCodec>>,
    outbox: Outbox,
    state: SessionState,
    shutdown: CancellationToken,
}

impl Session<TransportStream> {
    /// Create a disconnected session that will open its own connection.
    pub fn new(config: SessionConfig) -> Self {
        Self::detached(config)
    }

    /// Open the configured server connection and send the handshake.
    pub async fn connect(&mut self) -> Result<()> {
        self.expect_state("connect", SessionState::Disconnected)?;
        self.state = SessionState::Connecting;
        info!(host = %self.config.server.host, port = self.config.server.port, "connecting");

        match TransportStream::connect(&self.config.server).await {
            Ok(stream) => self.handshake(stream).await,
            Err(e) => {
                self.state = SessionState::Closed;
                Err(e)
            }
        }
    }
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Create a disconnected session for a stream supplied later through
    /// [`attach`](Self::attach).
    pub fn detached(config: SessionConfig) -> Self {
        let limiter = RateLimiter::new(config.channel_limits());
        Self {
            config,
            framed: None,
            outbox: Outbox::new(limiter),
            state: SessionState::Disconnected,
            shutdown: CancellationToken::new(),
        }
    }

    /// Take over an already connected stream and send the handshake.
    pub async fn attach(&mut self, stream: S) -> Result<()> {
        self.expect_state("attach", SessionState::Disconnected)?;
        self.state = SessionState::Connecting;
        self.handshake(stream).await
    }

    async fn handshake(&mut self, stream: S) -> Result<()> {
        let mut framed = Framed::new(stream, LineCodec::new());

        let mut commands = vec![
            ClientCommand::Pass(self.config.password.clone()),
            ClientCommand::Nick(self.config.username.clone()),
        ];
        commands.extend(Capability::HANDSHAKE.into_iter().map(ClientCommand::CapReq));
        commands.extend(
            self.config
                .channels
                .iter()
                .map(|c| ClientCommand::Join(c.name.clone())),
        );

        let written = write_all(&mut framed, commands).await;
        if let Err(e) = written {
            self.state = SessionState::Closed;
            return Err(e);
        }

        info!(username = %self.config.username, "authenticated");
        for channel in &self.config.channels {
            info!(channel = %channel.name, limit = channel.limit.get(), "joined");
        }

        self.framed = Some(framed);
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Process server lines until the connection ends.
    ///
    /// Returns `Ok(())` when the server closes the stream or the
    /// [`ShutdownHandle`] fires. The transport is closed in every case.
    pub async fn run(&mut self, registry: &mut Registry) -> Result<()> {
        self.expect_state("run", SessionState::Ready)?;
        self.state = SessionState::Running;

        let result = self.receive_loop(registry).await;
        let closed = self.close().await;
        result.and(closed)
    }

    async fn receive_loop(&mut self, registry: &mut Registry) -> Result<()> {
        while let Some(line) = self.next_line().await? {
            self.handle_line(&line, registry);
            self.flush_outbox().await?;
        }
        Ok(())
    }

    async fn next_line(&mut self) -> Result<Option<String>> {
        let timeout = self.config.read_timeout;
        let token = self.shutdown.clone();
        let framed = self.framed.as_mut().ok_or(SessionError::NotConnected)?;

        let read = async {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, framed.next())
                    .await
                    .map_err(|_| SessionError::ReadTimeout(limit)),
                None => Ok(framed.next().await),
            }
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("shutdown requested");
                Ok(None)
            }
            read = read => match read? {
                Some(Ok(line)) => Ok(Some(line)),
                Some(Err(e)) => Err(e.into()),
                None => {
                    info!("server closed the connection");
                    Ok(None)
                }
            },
        }
    }

    fn handle_line(&mut self, line: &str, registry: &mut Registry) {
        let event = Event::parse(line);
        match &event {
            Event::Ping { server } => {
                debug!(server, "ping");
                self.outbox.push_unlimited(ClientCommand::pong(server));
            }
            Event::Unrecognized => trace!(line, "unrecognized line"),
            _ => {
                let report = registry.dispatch(&event, &mut self.outbox);
                if report.invoked() > 0 {
                    trace!(
                        kind = event.kind(),
                        fired = report.fired,
                        failed = report.failed,
                        "dispatched"
                    );
                }
            }
        }
    }

    /// Write every queued command, in order.
    ///
    /// A command the codec refuses to encode is dropped; only transport
    /// errors are returned.
    async fn flush_outbox(&mut self) -> Result<()> {
        let framed = self.framed.as_mut().ok_or(SessionError::NotConnected)?;
        if self.outbox.pending_len() == 0 {
            return Ok(());
        }
        while let Some(cmd) = self.outbox.pop() {
            log_outbound(&cmd);
            let command = cmd.name();
            match framed.feed(cmd).await {
                Ok(()) => {}
                Err(
                    error @ (ProtocolError::IllegalControlChar(_)
                    | ProtocolError::LineTooLong { .. }),
                ) => {
                    warn!(command, error = %error, "dropping command that cannot be encoded");
                }
                Err(error) => return Err(error.into()),
            }
        }
        framed.flush().await?;
        Ok(())
    }

    /// Send a chat message to `channel` if its rate limit allows.
    pub async fn send_message(&mut self, channel: &str, text: &str) -> Result<SendOutcome> {
        if self.framed.is_none() {
            return Err(SessionError::NotConnected);
        }
        let outcome = self.outbox.send_message(channel, text);
        self.flush_outbox().await?;
        Ok(outcome)
    }

    /// Leave `channel`. Its rate-limit history is kept.
    pub async fn part(&mut self, channel: &str) -> Result<()> {
        if self.framed.is_none() {
            return Err(SessionError::NotConnected);
        }
        self.outbox.push_unlimited(ClientCommand::Part(channel.to_string()));
        self.flush_outbox().await?;
        info!(channel, "parted");
        Ok(())
    }

    /// Flush pending output and shut the transport down.
    ///
    /// Only the first call touches the transport.
    pub async fn close(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Ok(());
        }

        let flushed = if self.framed.is_some() {
            self.flush_outbox().await
        } else {
            Ok(())
        };
        self.state = SessionState::Closed;

        let shut = match self.framed.take() {
            Some(mut framed) => framed.close().await.map_err(SessionError::from),
            None => Ok(()),
        };
        info!("session closed");
        flushed.and(shut)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            token: self.shutdown.clone(),
        }
    }

    fn expect_state(&self, operation: &'static str, expected: SessionState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

impl<S> fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("connected", &self.framed.is_some())
            .finish_non_exhaustive()
    }
}

async fn write_all<S>(framed: &mut Framed<S, LineCodec>, commands: Vec<ClientCommand>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    for cmd in commands {
        log_outbound(&cmd);
        framed.feed(cmd).await?;
    }
    framed.flush().await?;
    Ok(())
}

fn log_outbound(cmd: &ClientCommand) {
    if cmd.is_sensitive() {
        debug!(command = cmd.name(), "-> <redacted>");
    } else {
        debug!(line = %cmd, "->");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelLimit;
    use std::num::NonZeroU32;
    use tokio::io::DuplexStream;

    fn config() -> SessionConfig {
        SessionConfig::new(
            "bot",
            "oauth:x",
            [ChannelLimit::new("#c", NonZeroU32::new(2).unwrap())],
        )
        .unwrap()
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::Disconnected.to_string(), "disconnected");
        assert_eq!(SessionState::Running.to_string(), "running");
    }

    #[tokio::test]
    async fn test_run_before_connect_is_rejected() {
        let mut session: Session<DuplexStream> = Session::detached(config());
        let mut registry = Registry::new();
        let err = session.run(&mut registry).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidState {
                operation: "run",
                state: SessionState::Disconnected
            }
        ));
    }

    #[tokio::test]
    async fn test_send_without_transport() {
        let mut session: Session<DuplexStream> = Session::detached(config());
        let err = session.send_message("#c", "hi").await.unwrap_err();
        assert!(matches!(err, SessionError::NotConnected));
    }

    #[tokio::test]
    async fn test_double_attach_is_rejected() {
        let (a, _a_peer) = tokio::io::duplex(1024);
        let (b, _b_peer) = tokio::io::duplex(1024);
        let mut session = Session::detached(config());
        session.attach(a).await.unwrap();
        assert_eq!(session.state(), SessionState::Ready);
        let err = session.attach(b).await.unwrap_err();
        assert!(matches!(err, SessionError::InvalidState { operation: "attach", .. }));
    }

    #[tokio::test]
    async fn test_close_without_connect() {
        let mut session: Session<DuplexStream> = Session::detached(config());
        session.close().await.unwrap();
        session.close().await.unwrap();
        assert_eq!(session.state(), SessionState::Closed);
    }

    #[test]
    fn test_shutdown_handle_is_shared() {
        let session: Session<DuplexStream> = Session::detached(config());
        let a = session.shutdown_handle();
        let b = a.clone();
        a.shutdown();
        assert!(b.is_shutdown());
    }
}
