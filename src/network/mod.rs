//! Network module.
//!
//! Contains the connection manager (handshake, keep-alive, reconnect state
//! machine) and the per-connection reader thread.

mod connection;
pub mod reader;

pub use connection::{
    Backoff, ConnectSettings, ConnectionManager, ConnectionState, ConnectionStatus,
    ReconnectPolicy, handshake_commands, is_auth_failure,
};
pub use reader::{CancelToken, ConnectTarget, ReaderEvent, WorkItem};
