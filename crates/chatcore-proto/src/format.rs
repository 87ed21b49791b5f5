//! Control character rules for outbound chat text.
//!
//! Chat bodies may carry IRC formatting codes (bold, color, the CTCP
//! delimiter, ...) but never a line break: anything after CR or LF would be
//! interpreted by the server as a second protocol line.
//!
//! Formatting codes are defined at <https://modern.ircdocs.horse/formatting>.

use std::borrow::Cow;

/// Returns true if the character is a valid IRC formatting code.
///
/// # Examples
///
/// ```
/// use chatcore_proto::format::is_irc_format_code;
///
/// assert!(is_irc_format_code('\x01')); // CTCP
/// assert!(is_irc_format_code('\x02')); // Bold
/// assert!(!is_irc_format_code('a'));
/// ```
#[inline]
pub fn is_irc_format_code(ch: char) -> bool {
    matches!(
        ch,
        '\x01' | '\x02' | '\x03' | '\x04' | '\x0F' | '\x11' | '\x16' | '\x1D' | '\x1E' | '\x1F'
    )
}

/// Returns true if a control character must not be sent in chat text.
///
/// BEL is always illegal. Other control characters are illegal unless they
/// are a recognized formatting code. CR and LF are handled separately by
/// [`sanitize_text`], which cuts the text at the first line break.
#[inline]
pub fn is_illegal_control_char(ch: char) -> bool {
    if ch == '\x07' {
        return true;
    }
    ch.is_control() && ch != '\r' && ch != '\n' && !is_irc_format_code(ch)
}

/// Prepare text for use as the trailing parameter of an outbound line.
///
/// Keeps only the first line and strips illegal control characters. Returns
/// `None` when nothing printable remains.
///
/// ```
/// use chatcore_proto::sanitize_text;
///
/// assert_eq!(sanitize_text("hi\r\nPRIVMSG #x :spoof").as_deref(), Some("hi"));
/// assert_eq!(sanitize_text("   "), None);
/// ```
pub fn sanitize_text(text: &str) -> Option<Cow<'_, str>> {
    let first = match text.find(['\r', '\n']) {
        Some(pos) => &text[..pos],
        None => text,
    };

    let cleaned = if first.chars().any(is_illegal_control_char) {
        Cow::Owned(
            first
                .chars()
                .filter(|c| !is_illegal_control_char(*c))
                .collect(),
        )
    } else {
        Cow::Borrowed(first)
    };

    if cleaned.trim().is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_codes() {
        assert!(is_irc_format_code('\x01'));
        assert!(is_irc_format_code('\x03'));
        assert!(is_irc_format_code('\x1F'));
        assert!(!is_irc_format_code('\x00'));
        assert!(!is_irc_format_code('\x07'));
        assert!(!is_irc_format_code('\n'));
    }

    #[test]
    fn test_illegal_control_chars() {
        assert!(is_illegal_control_char('\x07'));
        assert!(is_illegal_control_char('\x00'));
        assert!(!is_illegal_control_char('\x02'));
        assert!(!is_illegal_control_char('a'));
        assert!(!is_illegal_control_char(' '));
    }

    #[test]
    fn test_sanitize_cuts_at_line_break() {
        assert_eq!(sanitize_text("one\ntwo").as_deref(), Some("one"));
        assert_eq!(sanitize_text("one\rtwo").as_deref(), Some("one"));
    }

    #[test]
    fn test_sanitize_borrows_clean_text() {
        let out = sanitize_text("plain text").unwrap();
        assert!(matches!(out, Cow::Borrowed("plain text")));
    }

    #[test]
    fn test_sanitize_strips_bell() {
        assert_eq!(sanitize_text("ding\x07dong").as_deref(), Some("dingdong"));
    }

    #[test]
    fn test_sanitize_rejects_empty() {
        assert_eq!(sanitize_text(""), None);
        assert_eq!(sanitize_text("\r\nhidden"), None);
        assert_eq!(sanitize_text("\x07"), None);
    }

    #[test]
    fn test_sanitize_keeps_formatting() {
        assert_eq!(
            sanitize_text("\x02bold\x02").as_deref(),
            Some("\x02bold\x02")
        );
    }
}
