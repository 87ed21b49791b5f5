use super::tags::{Badges, TagMap};

/// A decoded chat line.
///
/// Built by [`parse_chat`](super::parse_chat) for every `PRIVMSG`; consumed
/// once by the dispatcher and then dropped.
///
/// # Example
///
/// ```
/// use chatcore_proto::parse_chat;
///
/// let msg = parse_chat(":alice!alice@host PRIVMSG #chan :hello", "#FFFFFF").unwrap();
/// assert_eq!(msg.sender, "alice");
/// assert_eq!(msg.channel, "#chan");
/// assert_eq!(msg.color, "#FFFFFF");
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChatMessage {
    /// Login name from the `:nick!` prefix.
    pub sender: String,
    /// Target channel, including the leading `#`.
    pub channel: String,
    /// Message text. For `/me` lines this is the unwrapped action text.
    pub body: String,
    /// Decoded tag block; empty for untagged lines.
    pub tags: TagMap,
    /// Badge names in encounter order.
    pub badges: Badges,
    /// Hex display color, or the configured default.
    pub color: String,
    /// Whether the body arrived as a CTCP ACTION.
    pub is_action: bool,
}

impl ChatMessage {
    /// Get the value of a tag by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// The `display-name` tag when present and non-empty, else the sender.
    pub fn display_name(&self) -> &str {
        match self.tag("display-name") {
            Some(name) if !name.is_empty() => name,
            _ => &self.sender,
        }
    }

    /// Server-assigned message id, used for threaded replies.
    pub fn id(&self) -> Option<&str> {
        self.tag("id").filter(|id| !id.is_empty())
    }

    /// Exact membership test against the parsed badge names.
    pub fn has_badge(&self, name: &str) -> bool {
        self.badges.iter().any(|b| b == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_with_tags(pairs: &[(&str, &str)]) -> ChatMessage {
        ChatMessage {
            sender: "alice".into(),
            tags: pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
            ..ChatMessage::default()
        }
    }

    #[test]
    fn test_display_name_prefers_tag() {
        let msg = message_with_tags(&[("display-name", "Alice")]);
        assert_eq!(msg.display_name(), "Alice");
    }

    #[test]
    fn test_display_name_falls_back_to_sender() {
        assert_eq!(message_with_tags(&[]).display_name(), "alice");
        assert_eq!(
            message_with_tags(&[("display-name", "")]).display_name(),
            "alice"
        );
    }

    #[test]
    fn test_has_badge_is_exact() {
        let mut msg = message_with_tags(&[]);
        msg.badges.push("moderator".into());
        assert!(msg.has_badge("moderator"));
        assert!(!msg.has_badge("mod"));
    }

    #[test]
    fn test_id_ignores_empty() {
        assert_eq!(message_with_tags(&[("id", "")]).id(), None);
        assert_eq!(message_with_tags(&[("id", "abc")]).id(), Some("abc"));
    }
}
