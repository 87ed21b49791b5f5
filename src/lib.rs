//! chatcore: a resilient chat-service connection core.
//!
//! Connects to a line-oriented, IRC-shaped chat service, keeps the
//! connection alive across network failures with bounded exponential
//! backoff, decodes tagged chat lines and routes prefixed commands to
//! handlers registered at runtime.
//!
//! ```no_run
//! use chatcore::{ChatClient, CommandSpec, Config, Credentials};
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::load("config.toml")?;
//! let mut client = ChatClient::new(&config);
//! client.register_command(CommandSpec::new("ping", |ctx| {
//!     ctx.reply("pong");
//!     Ok(())
//! }))?;
//! client.connect(Credentials::new("oauth:token", "mybot", "#mychannel"))?;
//! chatcore::run(&mut client, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credentials;
pub mod dispatch;
mod driver;
pub mod error;
pub mod handlers;
pub mod network;

pub use client::{ChatClient, Subscriber, SubscriptionId, TickReport};
pub use config::{Config, ConfigError, ValidationError};
pub use credentials::{CredentialProvider, Credentials, EnvCredentials};
pub use dispatch::TimerHandle;
pub use driver::run;
pub use error::{
    ConnectError, CredentialError, HandlerError, HandlerResult, RegistrationError, SendError,
};
pub use handlers::{CommandContext, CommandInfo, CommandSpec, DispatchOutcome, Outbox};
pub use network::{ConnectionState, ConnectionStatus};

pub use chatcore_proto::{ChatMessage, TagMap};
