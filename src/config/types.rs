//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;
use crate::network::ReconnectPolicy;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Client configuration.
///
/// Every section is optional; an empty file yields [`Config::default`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Chat server endpoint and handshake capabilities.
    #[serde(default)]
    pub server: ServerConfig,
    /// Keep-alive and idle detection.
    #[serde(default)]
    pub keepalive: KeepaliveConfig,
    /// Reconnect backoff policy.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
    /// Handoff queue draining.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Command prefix and argument pooling.
    #[serde(default)]
    pub commands: CommandsConfig,
    /// Message decoding.
    #[serde(default)]
    pub chat: ChatConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Chat server endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server hostname (e.g., "irc.chat.twitch.tv").
    #[serde(default = "default_host")]
    pub host: String,
    /// Plaintext port (default: 6667).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Milliseconds allowed for the TCP connect (default: 10000).
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Longest inbound line accepted, tags included (default: 8192).
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Capabilities requested with `CAP REQ` during the handshake.
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            max_line_len: default_max_line_len(),
            capabilities: default_capabilities(),
        }
    }
}

impl ServerConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

/// Keep-alive configuration.
///
/// A `PING` is sent every `interval_secs` while connected. When it fires and
/// nothing has been read for `idle_timeout_secs`, the connection is treated
/// as dead and the reconnect path takes over.
#[derive(Debug, Clone, Deserialize)]
pub struct KeepaliveConfig {
    /// Seconds between keep-alive pings (default: 60).
    #[serde(default = "default_keepalive_interval")]
    pub interval_secs: u64,
    /// Seconds without inbound traffic before reconnecting (default: 300).
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_keepalive_interval(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl KeepaliveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Reconnect backoff configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReconnectConfig {
    /// Delay before the first retry (default: 1000).
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
    /// Multiplier applied after each failed attempt (default: 2.0).
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    /// Upper bound on any single delay (default: 60000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Retries before giving up for good (default: 10).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_delay_ms: default_initial_delay_ms(),
            backoff_factor: default_backoff_factor(),
            max_delay_ms: default_max_delay_ms(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl ReconnectConfig {
    /// Build the runtime policy.
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            backoff_factor: self.backoff_factor,
            max_delay: Duration::from_millis(self.max_delay_ms),
            max_attempts: self.max_attempts,
        }
    }
}

/// Handoff queue draining.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Milliseconds between ticks of the drive loop (default: 50).
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Items drained per tick (default: 100).
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
    /// Queue depth that triggers a warning (default: 500).
    #[serde(default = "default_queue_warn_threshold")]
    pub queue_warn_threshold: usize,
    /// Minimum seconds between depth warnings (default: 10).
    #[serde(default = "default_queue_warn_interval")]
    pub queue_warn_interval_secs: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            max_batch: default_max_batch(),
            queue_warn_threshold: default_queue_warn_threshold(),
            queue_warn_interval_secs: default_queue_warn_interval(),
        }
    }
}

impl DispatchConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn queue_warn_interval(&self) -> Duration {
        Duration::from_secs(self.queue_warn_interval_secs)
    }
}

/// Command dispatch.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandsConfig {
    /// Prefix that marks a chat line as a command (default: "!").
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Arguments kept per invocation; extra tokens are dropped (default: 16).
    #[serde(default = "default_max_args")]
    pub max_args: usize,
    /// Argument slices kept in the pool between dispatches (default: 8).
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            max_args: default_max_args(),
            pool_size: default_pool_size(),
        }
    }
}

/// Message decoding.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Color used when a message carries no `color` tag (default: "#FFFFFF").
    #[serde(default = "default_color")]
    pub default_color: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            default_color: default_color(),
        }
    }
}
