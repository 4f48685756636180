//! Error types for the TMI client.
//!
//! This module defines error types for line framing, session lifecycle,
//! rule registration, and configuration loading. Parse failures of
//! individual server lines have no error type: an unparseable line
//! becomes [`Event::Unrecognized`](crate::Event::Unrecognized).

use std::time::Duration;

use thiserror::Error;

use crate::session::SessionState;

/// Convenience type alias for Results using [`SessionError`].
pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Result type returned by command and hook handlers.
///
/// A failing handler is logged and skipped; it never ends the session.
pub type HandlerResult = anyhow::Result<()>;

/// Line framing errors raised by [`LineCodec`](crate::line::LineCodec).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProtocolError {
    /// I/O error during reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An outbound line exceeded the maximum allowed length.
    #[error("line too long: {actual} bytes (limit {limit})")]
    LineTooLong {
        /// Length of the offending line.
        actual: usize,
        /// Configured limit.
        limit: usize,
    },

    /// Illegal control character in an outbound line.
    #[error("illegal control character: {0:?}")]
    IllegalControlChar(char),
}

/// Errors that end or reject a [`Session`](crate::Session) operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// I/O error on the underlying transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Framing error on the underlying transport.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// TLS setup failed.
    #[error("tls error: {0}")]
    Tls(String),

    /// The operation is not valid in the session's current state.
    #[error("cannot {operation} while session is {state}")]
    InvalidState {
        /// The attempted operation.
        operation: &'static str,
        /// The state the session was in.
        state: SessionState,
    },

    /// No data arrived within the configured read timeout.
    #[error("no data received for {0:?}")]
    ReadTimeout(Duration),

    /// The session has no open transport.
    #[error("session is not connected")]
    NotConnected,
}

/// Errors raised while registering rules.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistryError {
    /// The trigger could not be compiled into a pattern.
    #[error("invalid trigger {trigger:?}: {source}")]
    InvalidTrigger {
        /// The rejected trigger.
        trigger: String,
        /// The underlying pattern error.
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while loading a [`SessionConfig`](crate::SessionConfig).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path that was read.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration was not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}
