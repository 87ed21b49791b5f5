//! Command registry and dispatch.
//!
//! The `CommandRegistry` maps lower-cased command names to bindings added at
//! runtime by the application's components. Dispatch parses a chat body,
//! checks role restrictions against the sender's badges, tokenizes the
//! arguments into a pooled slice and invokes the handler with panics and
//! errors contained at this boundary.

use std::collections::{HashMap, HashSet};
use std::panic::{AssertUnwindSafe, catch_unwind};

use chatcore_proto::{TagMap, parse_badges};
use tracing::{debug, error, warn};

use super::args::{ArgumentPool, tokenize};
use super::context::{CommandContext, Outbox};
use crate::error::{HandlerResult, RegistrationError};

/// Role that admits every sender.
pub const WILDCARD_ROLE: &str = "*";

/// Boxed command handler.
pub type Handler = Box<dyn FnMut(&mut CommandContext<'_>) -> HandlerResult>;

/// Registration request for one command.
///
/// ```
/// use chatcore::handlers::CommandSpec;
///
/// let spec = CommandSpec::new("give", |ctx| {
///     ctx.reply("done");
///     Ok(())
/// })
/// .description("Give points to a viewer")
/// .usage("!give <user> <amount>")
/// .requires_args(true)
/// .owner("points")
/// .allowed_roles(["broadcaster", "moderator"]);
/// assert_eq!(spec.name(), "give");
/// ```
pub struct CommandSpec {
    name: String,
    handler: Handler,
    description: String,
    usage: String,
    requires_args: bool,
    owner: String,
    allowed_roles: Option<HashSet<String>>,
}

impl CommandSpec {
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: FnMut(&mut CommandContext<'_>) -> HandlerResult + 'static,
    {
        Self {
            name: name.into(),
            handler: Box::new(handler),
            description: String::new(),
            usage: String::new(),
            requires_args: false,
            owner: String::new(),
            allowed_roles: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    /// Refuse to run the handler when no arguments were given.
    pub fn requires_args(mut self, requires_args: bool) -> Self {
        self.requires_args = requires_args;
        self
    }

    /// Tag used by [`CommandRegistry::unregister_all_from`].
    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Restrict the command to senders holding one of these badges.
    /// Include `"*"` to admit everyone.
    pub fn allowed_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_roles = Some(
            roles
                .into_iter()
                .map(|r| r.as_ref().to_ascii_lowercase())
                .collect(),
        );
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

struct CommandBinding {
    handler: Handler,
    description: String,
    usage: String,
    requires_args: bool,
    owner: String,
    allowed_roles: Option<HashSet<String>>,
}

impl CommandBinding {
    fn admits(&self, tags: &TagMap) -> bool {
        let Some(allowed) = &self.allowed_roles else {
            return true;
        };
        if allowed.contains(WILDCARD_ROLE) {
            return true;
        }
        tags.get("badges")
            .map(String::as_str)
            .map(parse_badges)
            .is_some_and(|badges| {
                badges
                    .iter()
                    .any(|badge| allowed.contains(&badge.to_ascii_lowercase()))
            })
    }
}

/// Read-only view of a registered command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub usage: &'a str,
    pub owner: &'a str,
    pub restricted: bool,
}

/// What happened to one dispatched line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The body does not start with the command prefix.
    NotCommand,
    /// No binding for the command name.
    Unknown,
    /// The sender holds none of the allowed roles.
    Forbidden,
    /// The binding requires arguments and none were given.
    MissingArguments,
    /// The handler ran and returned `Ok`.
    Handled,
    /// The handler ran and returned an error or panicked.
    HandlerFailed,
}

impl DispatchOutcome {
    /// True when a handler was invoked, whatever its result.
    pub fn invoked(self) -> bool {
        matches!(self, Self::Handled | Self::HandlerFailed)
    }
}

/// Registry of command handlers.
pub struct CommandRegistry {
    prefix: String,
    bindings: HashMap<String, CommandBinding>,
    pool: ArgumentPool,
}

impl CommandRegistry {
    /// Create an empty registry. Commands are recognized by `prefix`; at most
    /// `max_args` arguments are passed to a handler.
    pub fn new(prefix: impl Into<String>, max_args: usize, pool_size: usize) -> Self {
        Self {
            prefix: prefix.into(),
            bindings: HashMap::new(),
            pool: ArgumentPool::new(max_args, pool_size),
        }
    }

    /// Add a command, replacing any existing binding of the same name.
    pub fn register(&mut self, spec: CommandSpec) -> Result<(), RegistrationError> {
        if spec.name.is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if spec.name.chars().any(char::is_whitespace) {
            return Err(RegistrationError::InvalidName(spec.name));
        }

        let name = spec.name.to_lowercase();
        let binding = CommandBinding {
            handler: spec.handler,
            description: spec.description,
            usage: spec.usage,
            requires_args: spec.requires_args,
            owner: spec.owner,
            allowed_roles: spec.allowed_roles,
        };
        let owner = binding.owner.clone();

        match self.bindings.insert(name.clone(), binding) {
            Some(previous) => warn!(
                command = %name,
                previous_owner = %previous.owner,
                owner = %owner,
                "Command re-registered; replacing existing binding"
            ),
            None => debug!(command = %name, owner = %owner, "Command registered"),
        }
        Ok(())
    }

    /// Remove one command. Returns whether it existed.
    pub fn unregister(&mut self, name: &str) -> bool {
        let removed = self.bindings.remove(&name.to_lowercase()).is_some();
        if removed {
            debug!(command = %name, "Command unregistered");
        }
        removed
    }

    /// Remove every command registered by `owner`, returning the count.
    pub fn unregister_all_from(&mut self, owner: &str) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|_, binding| binding.owner != owner);
        let removed = before - self.bindings.len();
        debug!(owner = %owner, removed, "Commands unregistered by owner");
        removed
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Registered commands, sorted by name.
    pub fn commands(&self) -> Vec<CommandInfo<'_>> {
        let mut list: Vec<_> = self
            .bindings
            .iter()
            .map(|(name, binding)| CommandInfo {
                name,
                description: &binding.description,
                usage: &binding.usage,
                owner: &binding.owner,
                restricted: binding.allowed_roles.is_some(),
            })
            .collect();
        list.sort_by(|a, b| a.name.cmp(b.name));
        list
    }

    /// Route one chat body to its handler.
    ///
    /// Replies the handler queues end up in `outbox`.
    pub fn dispatch(
        &mut self,
        sender: &str,
        raw_line: &str,
        tags: &TagMap,
        outbox: &mut Outbox,
    ) -> DispatchOutcome {
        let Some(rest) = raw_line.strip_prefix(self.prefix.as_str()) else {
            return DispatchOutcome::NotCommand;
        };
        let (name, arg_text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        if name.is_empty() {
            return DispatchOutcome::NotCommand;
        }
        let name = name.to_lowercase();

        let Some(binding) = self.bindings.get_mut(&name) else {
            return DispatchOutcome::Unknown;
        };
        if !binding.admits(tags) {
            debug!(command = %name, sender = %sender, "Command refused: role not allowed");
            return DispatchOutcome::Forbidden;
        }

        let mut args = self.pool.acquire();
        let dropped = tokenize(arg_text, &mut args);
        if dropped > 0 {
            warn!(
                command = %name,
                sender = %sender,
                dropped,
                max_args = args.capacity(),
                "Too many arguments; extra tokens dropped"
            );
        }

        if binding.requires_args && args.is_empty() {
            self.pool.release(args);
            debug!(command = %name, sender = %sender, "Command refused: arguments required");
            return DispatchOutcome::MissingArguments;
        }

        let result = {
            let mut ctx = CommandContext::new(sender, &name, &args, raw_line, tags, outbox);
            catch_unwind(AssertUnwindSafe(|| (binding.handler)(&mut ctx)))
        };
        self.pool.release(args);

        match result {
            Ok(Ok(())) => DispatchOutcome::Handled,
            Ok(Err(e)) => {
                warn!(
                    command = %name,
                    sender = %sender,
                    code = e.error_code(),
                    error = %e,
                    "Command handler failed"
                );
                DispatchOutcome::HandlerFailed
            }
            Err(payload) => {
                error!(
                    command = %name,
                    sender = %sender,
                    panic = %panic_message(payload.as_ref()),
                    "Command handler panicked"
                );
                DispatchOutcome::HandlerFailed
            }
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
