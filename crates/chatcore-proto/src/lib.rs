//! # chatcore-proto
//!
//! Line-level protocol support for IRC-shaped chat services.
//!
//! ## Features
//!
//! - Blocking, length-bounded line reading over any [`std::io::BufRead`]
//! - Best-effort decoding of inbound lines into [`ChatMessage`] values
//!   (tag map, badges, display color, sender, body)
//! - Fast-path detection of `PING` keep-alives
//! - Outbound [`Command`] serialization for the handshake and chat traffic
//!
//! The parser is deliberately forgiving: lines that do not look like a chat
//! message are classified as [`Inbound::Other`] instead of producing errors.
//!
//! ## Quick Start
//!
//! ```rust
//! use chatcore_proto::{Inbound, classify};
//!
//! let raw = "@badges=moderator/1;color=#FF69B4 :alice!alice@host PRIVMSG #chan :hello";
//! match classify(raw, "#FFFFFF") {
//!     Inbound::Chat(msg) => {
//!         assert_eq!(msg.sender, "alice");
//!         assert_eq!(msg.body, "hello");
//!         assert_eq!(msg.badges.as_slice(), ["moderator"]);
//!     }
//!     other => panic!("unexpected line: {other:?}"),
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod command;
pub mod ctcp;
pub mod error;
pub mod format;
pub mod line;
pub mod message;
pub mod prefix;

pub use self::command::Command;
pub use self::ctcp::{Ctcp, CtcpKind};
pub use self::error::{ProtocolError, Result};
pub use self::format::sanitize_text;
pub use self::line::{LineReader, DEFAULT_MAX_LINE_LEN};
pub use self::message::tags::{parse_badges, parse_tag_block, TagMap};
pub use self::message::{classify, parse_chat, ping_token, Badges, ChatMessage, Inbound};
