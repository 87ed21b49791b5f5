//! Outbound commands.
//!
//! The client only ever sends a handful of commands: the handshake
//! (`CAP REQ`, `PASS`, `NICK`, `JOIN`), keep-alives and chat messages. Each
//! serializes to a single line; [`Command::to_line`] adds the `\r\n`
//! terminator.

use std::borrow::Cow;
use std::fmt;

use crate::message::tags::escape_tag_value;

/// A line the client sends to the server.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    /// `CAP REQ :<caps...>`
    CapReq(Vec<String>),
    /// `PASS <token>`
    Pass(String),
    /// `NICK <nick>`
    Nick(String),
    /// `JOIN <channel>`
    Join(String),
    /// `[@reply-parent-msg-id=<id> ]PRIVMSG <target> :<text>`
    Privmsg {
        /// Channel or user to send to.
        target: String,
        /// Message text, already sanitized.
        text: String,
        /// Parent message id for threaded replies.
        reply_to: Option<String>,
    },
    /// `PING :<token>`
    Ping(String),
    /// `PONG :<token>`, or bare `PONG` for an empty token.
    Pong(String),
    /// A caller-supplied line, sent verbatim.
    Raw(String),
}

impl Command {
    /// Build a plain PRIVMSG.
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Command::Privmsg {
            target: target.into(),
            text: text.into(),
            reply_to: None,
        }
    }

    /// Serialize with the trailing `\r\n`.
    pub fn to_line(&self) -> String {
        format!("{self}\r\n")
    }

    /// A form safe to write to logs: the `PASS` secret is masked.
    pub fn redacted(&self) -> Cow<'_, str> {
        match self {
            Command::Pass(_) => Cow::Borrowed("PASS ********"),
            other => Cow::Owned(other.to_string()),
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Command").field(&self.redacted()).finish()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::CapReq(caps) => write!(f, "CAP REQ :{}", caps.join(" ")),
            Command::Pass(token) => write!(f, "PASS {token}"),
            Command::Nick(nick) => write!(f, "NICK {nick}"),
            Command::Join(channel) => write!(f, "JOIN {channel}"),
            Command::Privmsg {
                target,
                text,
                reply_to,
            } => {
                if let Some(parent) = reply_to {
                    write!(f, "@reply-parent-msg-id={} ", escape_tag_value(parent))?;
                }
                write!(f, "PRIVMSG {target} :{text}")
            }
            Command::Ping(token) => write!(f, "PING :{token}"),
            Command::Pong(token) if token.is_empty() => f.write_str("PONG"),
            Command::Pong(token) => write!(f, "PONG :{token}"),
            Command::Raw(line) => f.write_str(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handshake_lines() {
        let caps = Command::CapReq(vec!["example.tv/tags".into(), "example.tv/commands".into()]);
        assert_eq!(caps.to_line(), "CAP REQ :example.tv/tags example.tv/commands\r\n");
        assert_eq!(Command::Pass("oauth:abc".into()).to_string(), "PASS oauth:abc");
        assert_eq!(Command::Nick("bot".into()).to_string(), "NICK bot");
        assert_eq!(Command::Join("#chan".into()).to_string(), "JOIN #chan");
    }

    #[test]
    fn test_pong_echoes_token() {
        assert_eq!(Command::Pong("tmi.example.tv".into()).to_string(), "PONG :tmi.example.tv");
        assert_eq!(Command::Pong(String::new()).to_string(), "PONG");
    }

    #[test]
    fn test_threaded_privmsg() {
        let cmd = Command::Privmsg {
            target: "#chan".into(),
            text: "hi".into(),
            reply_to: Some("abc-123".into()),
        };
        assert_eq!(cmd.to_string(), "@reply-parent-msg-id=abc-123 PRIVMSG #chan :hi");
    }

    #[test]
    fn test_redacted_hides_pass() {
        let pass = Command::Pass("oauth:secret".into());
        assert!(!pass.redacted().contains("secret"));
        assert_eq!(Command::Nick("bot".into()).redacted(), "NICK bot");
    }
}
