//! Message source prefixes.
//!
//! The prefix identifies who sent a line. Chat lines carry the classic
//! `:nick!user@host` form; server lines carry a bare server name.
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

/// Origin of an inbound line.
#[derive(Clone, Eq, PartialEq, Debug, Hash)]
pub enum Prefix<'a> {
    /// Server name (e.g., "tmi.example.tv").
    ServerName(&'a str),
    /// User prefix: (nickname, username, hostname). Missing parts are empty.
    Nickname(&'a str, &'a str, &'a str),
}

impl<'a> Prefix<'a> {
    /// Parse a prefix without the leading `:`.
    ///
    /// This is a lenient parser: it never fails, and a name without `!` or
    /// `@` that contains a dot is taken to be a server.
    pub fn parse(s: &'a str) -> Self {
        let (before_host, host) = s.split_once('@').unwrap_or((s, ""));
        let (nick, user) = before_host.split_once('!').unwrap_or((before_host, ""));

        if user.is_empty() && host.is_empty() && nick.contains('.') {
            Prefix::ServerName(nick)
        } else {
            Prefix::Nickname(nick, user, host)
        }
    }

    /// The nickname, if this is a user prefix with a non-empty nick.
    pub fn nick(&self) -> Option<&'a str> {
        match *self {
            Prefix::Nickname(nick, _, _) if !nick.is_empty() => Some(nick),
            _ => None,
        }
    }

    /// The hostname or server name.
    pub fn host(&self) -> Option<&'a str> {
        match *self {
            Prefix::ServerName(name) => Some(name),
            Prefix::Nickname(_, _, host) if !host.is_empty() => Some(host),
            _ => None,
        }
    }
}

/// Extract the sender nickname from the `:nick!` marker.
///
/// Only the classic user form counts: the text must start with `:` and the
/// nick must be terminated by `!` before the first space.
///
/// ```
/// use chatcore_proto::prefix::sender_nick;
///
/// assert_eq!(sender_nick(":alice!alice@host PRIVMSG #c :hi"), Some("alice"));
/// assert_eq!(sender_nick(":tmi.example.tv 001 bot :Welcome"), None);
/// ```
pub fn sender_nick(rest: &str) -> Option<&str> {
    let source = rest.strip_prefix(':')?;
    let source = source.split(' ').next().unwrap_or(source);
    if !source.contains('!') {
        return None;
    }
    Prefix::parse(source).nick()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_user_prefix() {
        let prefix = Prefix::parse("nick!user@host.example");
        assert_eq!(prefix, Prefix::Nickname("nick", "user", "host.example"));
        assert_eq!(prefix.nick(), Some("nick"));
        assert_eq!(prefix.host(), Some("host.example"));
    }

    #[test]
    fn test_parse_server_name() {
        let prefix = Prefix::parse("tmi.example.tv");
        assert_eq!(prefix, Prefix::ServerName("tmi.example.tv"));
        assert_eq!(prefix.nick(), None);
    }

    #[test]
    fn test_parse_bare_nick() {
        assert_eq!(Prefix::parse("alice").nick(), Some("alice"));
    }

    #[test]
    fn test_sender_requires_bang() {
        assert_eq!(sender_nick(":alice PRIVMSG #c :hi"), None);
        assert_eq!(sender_nick("alice!a@h PRIVMSG #c :hi"), None);
        assert_eq!(sender_nick(":!user@host PRIVMSG #c :hi"), None);
    }

    #[test]
    fn test_sender_ignores_bang_after_space() {
        assert_eq!(sender_nick(":server NOTICE * :hi!there"), None);
    }
}
