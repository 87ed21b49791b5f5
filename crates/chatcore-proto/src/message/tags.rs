//! IRCv3 tag block decoding.
//!
//! A tagged line starts with `@key=value;key2=value2 `. Values are escaped on
//! the wire (`\:` for `;`, `\s` for space, and so on); keys are not.

use std::collections::HashMap;

use smallvec::SmallVec;

/// Decoded tags of one line. Keys without `=` map to the empty string.
pub type TagMap = HashMap<String, String>;

/// Ordered badge names of a chat participant.
pub type Badges = SmallVec<[String; 4]>;

/// Unescape a tag value from wire format.
///
/// Unknown escapes drop the backslash; a trailing lone backslash is dropped.
pub fn unescape_tag_value(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut iter = value.chars();
    while let Some(c) = iter.next() {
        let r = if c == '\\' {
            match iter.next() {
                Some(':') => ';',
                Some('s') => ' ',
                Some('\\') => '\\',
                Some('r') => '\r',
                Some('n') => '\n',
                Some(c) => c,
                None => break,
            }
        } else {
            c
        };
        unescaped.push(r);
    }
    unescaped
}

/// Escape a tag value for an outbound line.
pub fn escape_tag_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            ';' => escaped.push_str("\\:"),
            ' ' => escaped.push_str("\\s"),
            '\\' => escaped.push_str("\\\\"),
            '\r' => escaped.push_str("\\r"),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Parse a tag block (without the leading `@`) into a [`TagMap`].
///
/// Later duplicates of a key overwrite earlier ones.
///
/// ```
/// use chatcore_proto::parse_tag_block;
///
/// let tags = parse_tag_block("color=#FF69B4;display-name=Alice;flag");
/// assert_eq!(tags["color"], "#FF69B4");
/// assert_eq!(tags["flag"], "");
/// ```
pub fn parse_tag_block(block: &str) -> TagMap {
    block
        .split(';')
        .filter(|s| !s.is_empty())
        .filter_map(|tag| {
            let (key, value) = tag.split_once('=').unwrap_or((tag, ""));
            if key.is_empty() {
                None
            } else {
                Some((key.to_owned(), unescape_tag_value(value)))
            }
        })
        .collect()
}

/// Parse a `badges` tag value into badge names.
///
/// Each comma-separated entry is `name/version`; only the name is kept.
/// Encounter order is preserved and duplicates are not collapsed.
///
/// ```
/// use chatcore_proto::parse_badges;
///
/// let badges = parse_badges("moderator/1,subscriber/12");
/// assert_eq!(badges.as_slice(), ["moderator", "subscriber"]);
/// ```
pub fn parse_badges(value: &str) -> Badges {
    value
        .split(',')
        .filter_map(|entry| {
            let name = entry.split('/').next().unwrap_or(entry).trim();
            if name.is_empty() {
                None
            } else {
                Some(name.to_owned())
            }
        })
        .collect()
}

/// Resolve the display color, falling back when the tag is absent or empty.
pub fn resolve_color(tags: &TagMap, default_color: &str) -> String {
    match tags.get("color") {
        Some(color) if !color.is_empty() => color.clone(),
        _ => default_color.to_owned(),
    }
}
