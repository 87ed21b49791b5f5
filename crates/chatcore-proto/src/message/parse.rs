//! Best-effort line classification.
//!
//! This is not a grammar-driven parser. Each inbound line is checked against
//! the few shapes a chat client acts on (keep-alive, chat message, server
//! notices, reconnect requests) and everything else falls through to
//! [`Inbound::Other`]. Malformed input never produces an error.

use crate::ctcp::{Ctcp, CtcpKind};
use crate::prefix::sender_nick;

use super::tags::{parse_badges, parse_tag_block, resolve_color, Badges};
use super::types::ChatMessage;

const PRIVMSG_MARKER: &str = " PRIVMSG ";

/// Classification of one inbound line.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Inbound<'a> {
    /// Server keep-alive; answer with a `PONG` carrying this token.
    Ping(&'a str),
    /// A chat message.
    Chat(ChatMessage),
    /// The server asks the client to reconnect.
    Reconnect,
    /// A server notice with its text.
    Notice(&'a str),
    /// Anything else (numerics, membership changes, malformed lines).
    Other,
}

/// Split off the `@tag` block, returning `(block_without_at, rest)`.
fn split_tags(line: &str) -> (Option<&str>, &str) {
    match line.strip_prefix('@') {
        Some(tagged) => match tagged.split_once(' ') {
            Some((block, rest)) => (Some(block), rest.trim_start_matches(' ')),
            None => (Some(tagged), ""),
        },
        None => (None, line),
    }
}

/// The command keyword, skipping an optional `:source` prefix.
fn command_keyword(rest: &str) -> Option<&str> {
    let rest = if rest.starts_with(':') {
        rest.split_once(' ')?.1.trim_start_matches(' ')
    } else {
        rest
    };
    rest.split(' ').next().filter(|kw| !kw.is_empty())
}

/// Text after the first `:` following `keyword` in `rest`.
fn trailing_after<'a>(rest: &'a str, keyword: &str) -> Option<&'a str> {
    let start = rest.find(keyword)? + keyword.len();
    rest[start..].split_once(':').map(|(_, text)| text)
}

/// Return the keep-alive token if `line` is a `PING`.
///
/// ```
/// use chatcore_proto::ping_token;
///
/// assert_eq!(ping_token("PING :tmi.example.tv"), Some("tmi.example.tv"));
/// assert_eq!(ping_token("PINGU"), None);
/// ```
pub fn ping_token(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("PING")?;
    if !(rest.is_empty() || rest.starts_with(' ')) {
        return None;
    }
    let token = rest.trim_start_matches(' ');
    Some(token.strip_prefix(':').unwrap_or(token))
}

/// Decode a `PRIVMSG` line into a [`ChatMessage`].
///
/// Returns `None` when the line has no `:nick!` sender or no `PRIVMSG`
/// body. `default_color` fills in for an absent or empty `color` tag.
pub fn parse_chat(line: &str, default_color: &str) -> Option<ChatMessage> {
    let line = line.trim_end_matches(['\r', '\n']);
    let (block, rest) = split_tags(line);

    let sender = sender_nick(rest)?;
    let start = rest.find(PRIVMSG_MARKER)? + PRIVMSG_MARKER.len();
    let (target, body) = rest[start..].split_once(':')?;

    let (body, is_action) = match Ctcp::parse(body) {
        Some(Ctcp {
            kind: CtcpKind::Action,
            params,
        }) => (params.unwrap_or(""), true),
        _ => (body, false),
    };

    let tags = block.map(parse_tag_block).unwrap_or_default();
    let badges = tags
        .get("badges")
        .map(String::as_str)
        .map(parse_badges)
        .unwrap_or_else(Badges::new);
    let color = resolve_color(&tags, default_color);

    Some(ChatMessage {
        sender: sender.to_owned(),
        channel: target.trim().to_owned(),
        body: body.to_owned(),
        tags,
        badges,
        color,
        is_action,
    })
}

/// Classify one inbound line.
///
/// `PING` is checked first so keep-alives never pay for tag decoding.
pub fn classify<'a>(line: &'a str, default_color: &str) -> Inbound<'a> {
    let line = line.trim_end_matches(['\r', '\n']);

    if let Some(token) = ping_token(line) {
        return Inbound::Ping(token);
    }

    let (_, rest) = split_tags(line);
    match command_keyword(rest) {
        Some("PRIVMSG") => parse_chat(line, default_color)
            .map(Inbound::Chat)
            .unwrap_or(Inbound::Other),
        Some("RECONNECT") => Inbound::Reconnect,
        Some("NOTICE") => trailing_after(rest, "NOTICE")
            .map(Inbound::Notice)
            .unwrap_or(Inbound::Other),
        _ => Inbound::Other,
    }
}
