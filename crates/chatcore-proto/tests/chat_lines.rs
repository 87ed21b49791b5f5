//! Chat line decoding against realistic server traffic.
//!
//! Lines mirror what an IRC-shaped chat service sends once the tags and
//! commands capabilities are granted.

use chatcore_proto::{classify, parse_chat, ChatMessage, Command, Inbound};

const DEFAULT_COLOR: &str = "#9ACD32";

fn chat(line: &str) -> ChatMessage {
    match classify(line, DEFAULT_COLOR) {
        Inbound::Chat(msg) => msg,
        other => panic!("expected chat message, got {other:?}"),
    }
}

// =============================================================================
// Tagged messages
// =============================================================================

#[test]
fn test_full_tag_block() {
    let line = "@badge-info=subscriber/14;badges=moderator/1,subscriber/12;color=#FF69B4;\
display-name=Bob;emotes=;id=6f0e1a3c;mod=1;room-id=1337;subscriber=1;tmi-sent-ts=1700000000000;\
turbo=0;user-id=42;user-type=mod :bob!bob@bob.tmi.example.tv PRIVMSG #trivia :!answer1 paris";
    let msg = chat(line);

    assert_eq!(msg.sender, "bob");
    assert_eq!(msg.display_name(), "Bob");
    assert_eq!(msg.channel, "#trivia");
    assert_eq!(msg.body, "!answer1 paris");
    assert_eq!(msg.badges.as_slice(), ["moderator", "subscriber"]);
    assert_eq!(msg.color, "#FF69B4");
    assert_eq!(msg.id(), Some("6f0e1a3c"));
    assert_eq!(msg.tag("emotes"), Some(""));
    assert_eq!(msg.tag("user-id"), Some("42"));
}

#[test]
fn test_missing_color_uses_default() {
    let msg = chat("@badges=;color= :carol!carol@host PRIVMSG #trivia :hi");
    assert_eq!(msg.color, DEFAULT_COLOR);
    assert!(msg.badges.is_empty());
}

#[test]
fn test_escaped_tag_values() {
    let msg = chat("@system-msg=5\\sraiders\\sfrom\\:x :dan!dan@host PRIVMSG #c :yo");
    assert_eq!(msg.tag("system-msg"), Some("5 raiders from;x"));
}

#[test]
fn test_broadcaster_badge_without_version() {
    let msg = chat("@badges=broadcaster :eve!eve@host PRIVMSG #eve :!raffle start");
    assert!(msg.has_badge("broadcaster"));
}

// =============================================================================
// Control lines
// =============================================================================

#[test]
fn test_ping_is_answered_with_matching_pong() {
    let reply = match classify("PING :tmi.example.tv", DEFAULT_COLOR) {
        Inbound::Ping(token) => Command::Pong(token.to_owned()),
        other => panic!("expected ping, got {other:?}"),
    };
    assert_eq!(reply.to_line(), "PONG :tmi.example.tv\r\n");
}

#[test]
fn test_membership_and_numerics_are_other() {
    for line in [
        ":tmi.example.tv 001 bot :Welcome, GLHF!",
        ":tmi.example.tv CAP * ACK :example.tv/tags example.tv/commands",
        ":bot!bot@bot.tmi.example.tv JOIN #trivia",
        ":bot.tmi.example.tv 353 bot = #trivia :bot",
        "@emote-sets=0;user-type= :tmi.example.tv USERSTATE #trivia",
    ] {
        assert_eq!(classify(line, DEFAULT_COLOR), Inbound::Other, "line: {line}");
    }
}

#[test]
fn test_login_failure_notice() {
    let line = ":tmi.example.tv NOTICE * :Login authentication failed";
    assert_eq!(
        classify(line, DEFAULT_COLOR),
        Inbound::Notice("Login authentication failed")
    );
}

#[test]
fn test_parse_chat_rejects_server_source() {
    assert!(parse_chat(":tmi.example.tv PRIVMSG #c :spoof", DEFAULT_COLOR).is_none());
}

#[cfg(feature = "serde")]
#[test]
fn test_chat_message_serializes() {
    let msg = chat("@badges=vip/1 :fay!fay@host PRIVMSG #c :hi");
    let json = serde_json::to_value(&msg).unwrap();
    assert_eq!(json["sender"], "fay");
    assert_eq!(json["badges"][0], "vip");
}
