//! The `ChatClient` facade.
//!
//! One value owns the whole core: connection manager, handoff queue,
//! command registry, message subscribers and application timers. All of it
//! is mutated through `&mut self` on the consumer context; only the reader
//! thread runs elsewhere, and it talks to the client solely through the
//! handoff queue.
//!
//! Nothing happens between ticks. The host calls [`ChatClient::tick`] on a
//! fixed cadence, or hands the client to [`crate::run`].

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use chatcore_proto::{ChatMessage, Command, Inbound, classify, sanitize_text};
use tracing::{debug, error, trace, warn};

use crate::config::Config;
use crate::credentials::Credentials;
use crate::dispatch::{DepthMonitor, HandoffQueue, Scheduler, TimerHandle};
use crate::error::{ConnectError, RegistrationError, SendError};
use crate::handlers::{
    CommandInfo, CommandRegistry, CommandSpec, DispatchOutcome, Outbound, Outbox, panic_message,
};
use crate::network::{
    ConnectSettings, ConnectTarget, ConnectionManager, ConnectionState, ConnectionStatus,
    WorkItem, is_auth_failure,
};

/// Callback for every decoded chat message.
pub type Subscriber = Box<dyn FnMut(&ChatMessage, &mut Outbox)>;

type TimerTask = Box<dyn FnOnce(&mut ChatClient)>;

const MIN_TICK: Duration = Duration::from_millis(1);

/// Identifies a message subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// What one tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickReport {
    /// Queue items handled this tick.
    pub processed: usize,
    /// Items still queued afterwards.
    pub backlog: usize,
}

/// Connection core for one chat channel.
pub struct ChatClient {
    connection: ConnectionManager,
    queue: HandoffQueue<WorkItem>,
    depth: DepthMonitor,
    registry: CommandRegistry,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    timers: Scheduler<TimerTask>,
    outbox: Outbox,
    max_batch: usize,
    tick_interval: Duration,
    default_color: String,
    last_tick: Instant,
}

impl ChatClient {
    pub fn new(config: &Config) -> Self {
        let queue = HandoffQueue::new();
        let settings = ConnectSettings {
            target: ConnectTarget {
                host: config.server.host.clone(),
                port: config.server.port,
                connect_timeout: config.server.connect_timeout(),
                max_line_len: config.server.max_line_len,
            },
            capabilities: config.server.capabilities.clone(),
            keepalive_interval: config.keepalive.interval(),
            idle_timeout: config.keepalive.idle_timeout(),
        };

        Self {
            connection: ConnectionManager::new(settings, config.reconnect.policy(), queue.clone()),
            queue,
            depth: DepthMonitor::new(
                config.dispatch.queue_warn_threshold,
                config.dispatch.queue_warn_interval(),
            ),
            registry: CommandRegistry::new(
                config.commands.prefix.clone(),
                config.commands.max_args,
                config.commands.pool_size,
            ),
            subscribers: Vec::new(),
            next_subscription: 1,
            timers: Scheduler::new(),
            outbox: Outbox::new(),
            max_batch: config.dispatch.max_batch.max(1),
            tick_interval: config.dispatch.tick().max(MIN_TICK),
            default_color: config.chat.default_color.clone(),
            last_tick: Instant::now(),
        }
    }

    // ------------------------------------------------------------------
    // Connection
    // ------------------------------------------------------------------

    /// Start connecting. Progress is made by subsequent ticks.
    pub fn connect(&mut self, credentials: Credentials) -> Result<(), ConnectError> {
        let now = self.now();
        self.connection.connect(credentials, now)
    }

    /// Drop the connection. Without `reconnect` the client stops in
    /// `Disconnected` and discards anything still queued.
    pub fn disconnect(&mut self, reconnect: bool) {
        let now = self.now();
        self.connection.disconnect(reconnect, now);
        if !reconnect {
            let dropped = self.queue.clear();
            let unsent = self.outbox.drain().count();
            if dropped > 0 || unsent > 0 {
                debug!(dropped, unsent, "Discarded pending work on disconnect");
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn status(&self) -> ConnectionStatus {
        self.connection.status()
    }

    /// Items waiting in the handoff queue.
    pub fn queue_depth(&self) -> usize {
        self.queue.len()
    }

    /// Cadence the drive loop should tick at.
    pub fn tick_interval(&self) -> Duration {
        self.tick_interval
    }

    // ------------------------------------------------------------------
    // Sending
    // ------------------------------------------------------------------

    /// Send chat text to the joined channel.
    ///
    /// Only the first line of `text` is sent.
    pub fn send_message(&mut self, text: &str) -> Result<(), SendError> {
        let now = self.now();
        self.send_chat(text, None, now)
    }

    /// Send a raw protocol line. Only the first line of `line` is sent.
    pub fn send_protocol_command(&mut self, line: &str) -> Result<(), SendError> {
        let now = self.now();
        self.send_raw(line, now)
    }

    fn send_chat(
        &mut self,
        text: &str,
        reply_to: Option<String>,
        now: Instant,
    ) -> Result<(), SendError> {
        let text = sanitize_text(text).ok_or(SendError::EmptyText)?;
        let channel = self
            .connection
            .channel()
            .ok_or(SendError::NotConnected(self.connection.state()))?
            .to_owned();
        let command = Command::Privmsg {
            target: channel,
            text: text.into_owned(),
            reply_to,
        };
        self.connection.send(&command, now)
    }

    fn send_raw(&mut self, line: &str, now: Instant) -> Result<(), SendError> {
        let line = sanitize_text(line).ok_or(SendError::EmptyText)?;
        self.connection.send(&Command::Raw(line.into_owned()), now)
    }

    // ------------------------------------------------------------------
    // Commands and subscriptions
    // ------------------------------------------------------------------

    pub fn register_command(&mut self, spec: CommandSpec) -> Result<(), RegistrationError> {
        self.registry.register(spec)
    }

    pub fn unregister_command(&mut self, name: &str) -> bool {
        self.registry.unregister(name)
    }

    pub fn unregister_all_from(&mut self, owner: &str) -> usize {
        self.registry.unregister_all_from(owner)
    }

    /// Registered commands, sorted by name.
    pub fn commands(&self) -> Vec<CommandInfo<'_>> {
        self.registry.commands()
    }

    /// Call `callback` for every chat message, before command dispatch.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChatMessage, &mut Outbox) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    // ------------------------------------------------------------------
    // Timers
    // ------------------------------------------------------------------

    /// Run `task` on the first tick at least `delay` from now.
    pub fn run_after<F>(&mut self, delay: Duration, task: F) -> TimerHandle
    where
        F: FnOnce(&mut ChatClient) + 'static,
    {
        let now = self.now();
        self.timers.run_after(now, delay, Box::new(task))
    }

    pub fn cancel_timer(&mut self, handle: TimerHandle) -> bool {
        self.timers.cancel(handle)
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Drain and process one batch, then fire due timers.
    pub fn tick(&mut self) -> TickReport {
        self.tick_at(Instant::now())
    }

    /// [`tick`](Self::tick) with an explicit clock. Time never runs
    /// backwards: an earlier `now` than a previous tick is ignored.
    pub fn tick_at(&mut self, now: Instant) -> TickReport {
        self.last_tick = self.last_tick.max(now);
        let now = self.last_tick;

        self.depth.observe(self.queue.len(), now);
        let batch = self.queue.drain_batch(self.max_batch);
        let processed = batch.len();
        for item in batch {
            if let Some(line) = self.connection.handle_event(item, now) {
                self.process_line(&line, now);
            }
        }

        self.connection.poll_timers(now);
        for task in self.timers.take_due(now) {
            if let Err(payload) = catch_unwind(AssertUnwindSafe(|| task(self))) {
                error!(panic = %panic_message(payload.as_ref()), "Timer task panicked");
            }
        }
        self.flush_outbox(now);

        TickReport {
            processed,
            backlog: self.queue.len(),
        }
    }

    fn now(&self) -> Instant {
        self.last_tick.max(Instant::now())
    }

    fn process_line(&mut self, line: &str, now: Instant) {
        match classify(line, &self.default_color) {
            Inbound::Ping(token) => {
                if let Err(e) = self.connection.send(&Command::Pong(token.to_owned()), now) {
                    warn!(error = %e, "Could not answer PING");
                }
            }
            Inbound::Chat(message) => self.deliver(&message, now),
            Inbound::Reconnect => self.connection.server_reconnect(now),
            Inbound::Notice(text) if is_auth_failure(text) => self.connection.fail(text),
            Inbound::Notice(text) => debug!(notice = %text, "Server notice"),
            Inbound::Other => trace!(line = %line, "Ignored line"),
        }
    }

    fn deliver(&mut self, message: &ChatMessage, now: Instant) {
        let outbox = &mut self.outbox;
        for (id, subscriber) in &mut self.subscribers {
            let result = catch_unwind(AssertUnwindSafe(|| subscriber(message, &mut *outbox)));
            if let Err(payload) = result {
                error!(
                    subscription = id.0,
                    panic = %panic_message(payload.as_ref()),
                    "Message subscriber panicked"
                );
            }
        }

        let outcome =
            self.registry
                .dispatch(&message.sender, &message.body, &message.tags, &mut self.outbox);
        if outcome != DispatchOutcome::NotCommand {
            debug!(sender = %message.sender, outcome = ?outcome, "Command dispatched");
        }
        self.flush_outbox(now);
    }

    fn flush_outbox(&mut self, now: Instant) {
        if self.outbox.is_empty() {
            return;
        }
        let pending: Vec<Outbound> = self.outbox.drain().collect();
        for outbound in pending {
            let result = match outbound {
                Outbound::Chat { text, reply_to } => self.send_chat(&text, reply_to, now),
                Outbound::Protocol(line) => self.send_raw(&line, now),
            };
            if let Err(e) = result {
                warn!(error = %e, "Dropped queued reply");
            }
        }
    }
}
