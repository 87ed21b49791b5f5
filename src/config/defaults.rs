//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_host() -> String {
    "irc.chat.twitch.tv".to_string()
}

pub fn default_port() -> u16 {
    6667
}

pub fn default_connect_timeout_ms() -> u64 {
    10_000
}

pub fn default_max_line_len() -> usize {
    chatcore_proto::DEFAULT_MAX_LINE_LEN
}

pub fn default_capabilities() -> Vec<String> {
    vec!["twitch.tv/tags".to_string(), "twitch.tv/commands".to_string()]
}

// =============================================================================
// Keep-alive Defaults
// =============================================================================

pub fn default_keepalive_interval() -> u64 {
    60
}

pub fn default_idle_timeout() -> u64 {
    300
}

// =============================================================================
// Reconnect Defaults
// =============================================================================

pub fn default_initial_delay_ms() -> u64 {
    1_000
}

pub fn default_backoff_factor() -> f64 {
    2.0
}

pub fn default_max_delay_ms() -> u64 {
    60_000
}

pub fn default_max_attempts() -> u32 {
    10
}

// =============================================================================
// Dispatch Defaults
// =============================================================================

pub fn default_tick_ms() -> u64 {
    50
}

pub fn default_max_batch() -> usize {
    100
}

pub fn default_queue_warn_threshold() -> usize {
    500
}

pub fn default_queue_warn_interval() -> u64 {
    10
}

// =============================================================================
// Command Defaults
// =============================================================================

pub fn default_prefix() -> String {
    "!".to_string()
}

pub fn default_max_args() -> usize {
    16
}

pub fn default_pool_size() -> usize {
    8
}

// =============================================================================
// Chat Defaults
// =============================================================================

pub fn default_color() -> String {
    "#FFFFFF".to_string()
}
