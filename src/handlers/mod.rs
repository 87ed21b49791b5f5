//! Chat command handlers.
//!
//! Components register commands at runtime with a [`CommandSpec`]; the
//! [`CommandRegistry`] routes prefixed chat bodies to them.
//!
//! ## Handler contract
//!
//! Handlers run on the consumer context and receive a [`CommandContext`]
//! borrowing the message. They reply through the context; the client writes
//! the replies after the handler returns. An `Err` or a panic is logged with
//! the command name and does not affect later dispatches.

mod args;
mod context;
mod registry;

pub use args::{ArgumentPool, ArgumentSlice, tokenize};
pub use context::{CommandContext, Outbound, Outbox};
pub use registry::{
    CommandInfo, CommandRegistry, CommandSpec, DispatchOutcome, Handler, WILDCARD_ROLE,
};

pub(crate) use registry::panic_message;
