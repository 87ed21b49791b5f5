//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.host is required")]
    MissingHost,
    #[error("server.port must be non-zero")]
    ZeroPort,
    #[error("server.connect_timeout_ms must be non-zero")]
    ZeroConnectTimeout,
    #[error("server.max_line_len must be at least 512, got {0}")]
    LineLimitTooSmall(usize),
    #[error("keepalive.interval_secs must be non-zero")]
    ZeroKeepaliveInterval,
    #[error("keepalive.idle_timeout_secs ({idle}) must exceed keepalive.interval_secs ({interval})")]
    IdleTimeoutTooShort { idle: u64, interval: u64 },
    #[error("reconnect.backoff_factor must be a finite number >= 1.0, got {0}")]
    InvalidBackoffFactor(f64),
    #[error("reconnect.initial_delay_ms ({initial}) exceeds reconnect.max_delay_ms ({max})")]
    InitialDelayExceedsMax { initial: u64, max: u64 },
    #[error("dispatch.tick_ms must be non-zero")]
    ZeroTick,
    #[error("dispatch.max_batch must be non-zero")]
    ZeroBatch,
    #[error("commands.prefix is required")]
    MissingPrefix,
    #[error("commands.prefix must not contain whitespace, got '{0}'")]
    InvalidPrefix(String),
    #[error("commands.max_args must be non-zero")]
    ZeroMaxArgs,
    #[error("chat.default_color must match #RRGGBB, got '{0}'")]
    InvalidColor(String),
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Server
    if config.server.host.trim().is_empty() {
        errors.push(ValidationError::MissingHost);
    }
    if config.server.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }
    if config.server.connect_timeout_ms == 0 {
        errors.push(ValidationError::ZeroConnectTimeout);
    }
    if config.server.max_line_len < 512 {
        errors.push(ValidationError::LineLimitTooSmall(config.server.max_line_len));
    }

    // Keep-alive
    let keepalive = &config.keepalive;
    if keepalive.interval_secs == 0 {
        errors.push(ValidationError::ZeroKeepaliveInterval);
    } else if keepalive.idle_timeout_secs <= keepalive.interval_secs {
        errors.push(ValidationError::IdleTimeoutTooShort {
            idle: keepalive.idle_timeout_secs,
            interval: keepalive.interval_secs,
        });
    }

    // Reconnect
    let reconnect = &config.reconnect;
    if !reconnect.backoff_factor.is_finite() || reconnect.backoff_factor < 1.0 {
        errors.push(ValidationError::InvalidBackoffFactor(reconnect.backoff_factor));
    }
    if reconnect.initial_delay_ms > reconnect.max_delay_ms {
        errors.push(ValidationError::InitialDelayExceedsMax {
            initial: reconnect.initial_delay_ms,
            max: reconnect.max_delay_ms,
        });
    }

    // Dispatch
    if config.dispatch.tick_ms == 0 {
        errors.push(ValidationError::ZeroTick);
    }
    if config.dispatch.max_batch == 0 {
        errors.push(ValidationError::ZeroBatch);
    }

    // Commands
    let prefix = &config.commands.prefix;
    if prefix.is_empty() {
        errors.push(ValidationError::MissingPrefix);
    } else if prefix.chars().any(char::is_whitespace) {
        errors.push(ValidationError::InvalidPrefix(prefix.clone()));
    }
    if config.commands.max_args == 0 {
        errors.push(ValidationError::ZeroMaxArgs);
    }

    // Chat
    if !is_hex_color(&config.chat.default_color) {
        errors.push(ValidationError::InvalidColor(config.chat.default_color.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
