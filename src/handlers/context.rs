//! Handler context and reply outbox.
//!
//! Handlers never touch the socket. Replies are queued on an [`Outbox`] and
//! written by the client once the handler returns.

use chatcore_proto::TagMap;

use super::args::ArgumentSlice;

/// A line queued by a handler or subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Chat text for the joined channel, optionally threaded under a parent
    /// message id.
    Chat {
        text: String,
        reply_to: Option<String>,
    },
    /// A raw protocol line.
    Protocol(String),
}

/// Replies collected during one dispatch cycle.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<Outbound>,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue chat text for the channel.
    pub fn say(&mut self, text: impl Into<String>) {
        self.pending.push(Outbound::Chat {
            text: text.into(),
            reply_to: None,
        });
    }

    /// Queue chat text threaded under `parent_id`.
    pub fn say_threaded(&mut self, parent_id: impl Into<String>, text: impl Into<String>) {
        self.pending.push(Outbound::Chat {
            text: text.into(),
            reply_to: Some(parent_id.into()),
        });
    }

    /// Queue a raw protocol line.
    pub fn protocol(&mut self, line: impl Into<String>) {
        self.pending.push(Outbound::Protocol(line.into()));
    }

    /// Take every queued line in order.
    pub fn drain(&mut self) -> std::vec::Drain<'_, Outbound> {
        self.pending.drain(..)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// Everything a command handler sees about one invocation.
pub struct CommandContext<'a> {
    /// Sender's login name.
    pub sender: &'a str,
    /// Lower-cased command name, without prefix.
    pub command: &'a str,
    /// Parsed arguments.
    pub args: &'a ArgumentSlice,
    /// The chat body the command came from, prefix included.
    pub raw_line: &'a str,
    /// Message tags.
    pub tags: &'a TagMap,
    outbox: &'a mut Outbox,
}

impl<'a> CommandContext<'a> {
    pub(crate) fn new(
        sender: &'a str,
        command: &'a str,
        args: &'a ArgumentSlice,
        raw_line: &'a str,
        tags: &'a TagMap,
        outbox: &'a mut Outbox,
    ) -> Self {
        Self {
            sender,
            command,
            args,
            raw_line,
            tags,
            outbox,
        }
    }

    /// Argument at `index`.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index)
    }

    /// Tag value by key.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Reply in the channel.
    pub fn reply(&mut self, text: impl Into<String>) {
        self.outbox.say(text);
    }

    /// Reply threaded under the triggering message, or a plain reply when
    /// the message carried no `id` tag.
    pub fn reply_threaded(&mut self, text: impl Into<String>) {
        match self.tags.get("id").filter(|id| !id.is_empty()) {
            Some(id) => self.outbox.say_threaded(id.clone(), text),
            None => self.outbox.say(text),
        }
    }

    /// Queue a raw protocol line.
    pub fn send_raw(&mut self, line: impl Into<String>) {
        self.outbox.protocol(line);
    }
}
