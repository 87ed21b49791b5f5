//! Unified error handling for chatcore.
//!
//! One `thiserror` enum per concern. Network failures are recovered by the
//! reconnect state machine; handler failures are isolated per dispatch;
//! registration failures are returned synchronously.

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::network::ConnectionState;

// ============================================================================
// Connection Errors
// ============================================================================

/// Failure to establish a socket connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("could not resolve {host}:{port}")]
    Resolve { host: String, port: u16 },

    #[error("connect to {addr} timed out after {timeout:?}")]
    Timeout { addr: SocketAddr, timeout: Duration },

    #[error("connect failed: {0}")]
    Io(#[from] io::Error),

    #[error("reader thread could not be started: {0}")]
    Spawn(io::Error),

    #[error("connection already {state}")]
    AlreadyActive { state: ConnectionState },
}

impl ConnectError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Resolve { .. } => "resolve",
            Self::Timeout { .. } => "timeout",
            Self::Io(_) => "io",
            Self::Spawn(_) => "spawn",
            Self::AlreadyActive { .. } => "already_active",
        }
    }
}

/// Failure to write an outbound line.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("not connected (state: {0})")]
    NotConnected(ConnectionState),

    #[error("no text to send")]
    EmptyText,

    #[error("write failed: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// Command Errors
// ============================================================================

/// Rejected command registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("command name is empty")]
    EmptyName,

    #[error("command name {0:?} contains whitespace")]
    InvalidName(String),
}

/// Errors a command handler can report.
///
/// Returned errors are logged with the command name and never propagate past
/// the dispatcher.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("not enough arguments")]
    NeedMoreParams,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams => "need_more_params",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Internal(_) => "internal_error",
            Self::Other(_) => "other",
        }
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Credential Errors
// ============================================================================

/// Credentials could not be obtained from the provider.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("missing credential: {0}")]
    Missing(&'static str),
}
