//! Connection state and the status snapshot exposed to the application.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// Where the connection is in its lifecycle.
///
/// ```text
/// Disconnected ──connect──▶ Connecting ──handshake──▶ Connected
///                              │    ▲                    │
///                      I/O error    └─ backoff timer ─┐  │ I/O error, idle,
///                              ▼                      │  ▼ RECONNECT
///                           Reconnecting ◀────────────┴──┘
///                              │
///                   attempts exhausted / auth rejected
///                              ▼
///                            Failed
/// ```
///
/// `disconnect(false)` moves any state to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
    Failed,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Reconnecting => "reconnecting",
            Self::Failed => "failed",
        }
    }

    /// True while a connection exists or is being pursued.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Connecting | Self::Connected | Self::Reconnecting)
    }

    /// True for states no timer or reader event will leave.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Disconnected | Self::Failed)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the connection manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    /// Reconnect attempts counted in the current outage.
    pub attempt: u32,
    /// Delay the next reconnect attempt would use.
    pub current_delay: Duration,
    /// When the last inbound line was seen on the current connection.
    pub last_activity: Option<Instant>,
    /// Wall-clock time the current session reached `Connected`.
    pub connected_since: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_classes() {
        assert!(ConnectionState::Reconnecting.is_active());
        assert!(!ConnectionState::Failed.is_active());
        assert!(ConnectionState::Disconnected.is_terminal());
        assert!(ConnectionState::Failed.is_terminal());
        assert!(!ConnectionState::Connected.is_terminal());
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
    }
}
