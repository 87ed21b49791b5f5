//! Inbound chat line types and parsing.

mod parse;
/// IRCv3 tag block utilities.
pub mod tags;
mod types;

pub use self::parse::{classify, parse_chat, ping_token, Inbound};
pub use self::tags::{Badges, TagMap};
pub use self::types::ChatMessage;
