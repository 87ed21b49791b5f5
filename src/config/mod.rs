//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions, one per TOML section
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup validation collecting every error

mod defaults;
mod types;
mod validation;

pub use types::{
    ChatConfig, CommandsConfig, Config, ConfigError, DispatchConfig, KeepaliveConfig,
    ReconnectConfig, ServerConfig,
};
pub use validation::{ValidationError, validate};
