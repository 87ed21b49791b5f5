//! Login credentials and where they come from.
//!
//! Acquiring or refreshing tokens is the host application's job; the client
//! only consumes a [`Credentials`] value through a [`CredentialProvider`].

use std::env;
use std::fmt;

use crate::error::CredentialError;

/// Token, nick and channel used for the handshake.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
    nick: String,
    channel: String,
}

impl Credentials {
    /// The channel is normalized to lower case with a leading `#`.
    pub fn new(
        token: impl Into<String>,
        nick: impl Into<String>,
        channel: impl AsRef<str>,
    ) -> Self {
        Self {
            token: token.into(),
            nick: nick.into(),
            channel: normalize_channel(channel.as_ref()),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn nick(&self) -> &str {
        &self.nick
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"********")
            .field("nick", &self.nick)
            .field("channel", &self.channel)
            .finish()
    }
}

fn normalize_channel(channel: &str) -> String {
    let name = channel.trim().trim_start_matches('#');
    format!("#{}", name.to_lowercase())
}

/// Source of credentials.
pub trait CredentialProvider {
    fn credentials(&self) -> Result<Credentials, CredentialError>;
}

/// Reads `CHATCORE_TOKEN`, `CHATCORE_NICK` and `CHATCORE_CHANNEL`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl EnvCredentials {
    pub const TOKEN_VAR: &'static str = "CHATCORE_TOKEN";
    pub const NICK_VAR: &'static str = "CHATCORE_NICK";
    pub const CHANNEL_VAR: &'static str = "CHATCORE_CHANNEL";
}

fn required(var: &'static str) -> Result<String, CredentialError> {
    env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(CredentialError::Missing(var))
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        let token = required(Self::TOKEN_VAR)?;
        let nick = required(Self::NICK_VAR)?;
        let channel = required(Self::CHANNEL_VAR)?;
        Ok(Credentials::new(token, nick, channel))
    }
}

impl CredentialProvider for Credentials {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        Ok(self.clone())
    }
}
