//! Connection manager: socket ownership, handshake, keep-alive and the
//! reconnect state machine.
//!
//! ```text
//!   consumer (tick)                         reader thread (per epoch)
//!   ┌──────────────────────────┐            ┌──────────────────────────┐
//!   │ ConnectionManager        │  spawn     │ connect_timeout          │
//!   │  state / backoff / epoch ├───────────▶│ Established(write half)  │
//!   │  writer ◀────────────────┼── queue ───┤ Line / ConnectionLost    │
//!   │  timers: Reconnect,      │            └──────────────────────────┘
//!   │          KeepAlive       │
//!   └──────────────────────────┘
//! ```
//!
//! All state lives on the consumer. Every write goes through [`send`], and
//! every transition happens while handling a reader event or a timer, so no
//! locking beyond the handoff queue is needed.
//!
//! [`send`]: ConnectionManager::send

mod backoff;
mod handshake;
mod state;

pub use backoff::{Backoff, ReconnectPolicy};
pub use handshake::{handshake_commands, is_auth_failure};
pub use state::{ConnectionState, ConnectionStatus};

use std::net::{Shutdown, TcpStream};
use std::time::{Duration, Instant};

use chatcore_proto::Command;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::reader::{self, ConnectTarget, ReaderEvent, ReaderHandle, WorkItem};
use crate::credentials::Credentials;
use crate::dispatch::{HandoffQueue, Scheduler, TimerHandle};
use crate::error::{ConnectError, SendError};

/// Static connection parameters.
#[derive(Debug, Clone)]
pub struct ConnectSettings {
    pub target: ConnectTarget,
    /// Capabilities requested during the handshake.
    pub capabilities: Vec<String>,
    pub keepalive_interval: Duration,
    pub idle_timeout: Duration,
}

/// How often a deferred attempt rechecks the previous reader.
const RETIRED_READER_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnTimer {
    Reconnect,
    KeepAlive,
}

/// Owns the socket and drives the reconnect state machine.
pub struct ConnectionManager {
    settings: ConnectSettings,
    queue: HandoffQueue<WorkItem>,
    state: ConnectionState,
    backoff: Backoff,
    credentials: Option<Credentials>,
    /// Bumped whenever the current connection is abandoned.
    epoch: u64,
    reader: Option<ReaderHandle>,
    /// Cancelled reader that may still be blocked in its connect. No new
    /// attempt starts until it has exited.
    retired: Option<ReaderHandle>,
    writer: Option<TcpStream>,
    timers: Scheduler<ConnTimer>,
    reconnect_timer: Option<TimerHandle>,
    keepalive_timer: Option<TimerHandle>,
    last_activity: Option<Instant>,
    connected_since: Option<DateTime<Utc>>,
}

impl ConnectionManager {
    pub fn new(
        settings: ConnectSettings,
        policy: ReconnectPolicy,
        queue: HandoffQueue<WorkItem>,
    ) -> Self {
        Self {
            settings,
            queue,
            state: ConnectionState::Disconnected,
            backoff: Backoff::new(policy),
            credentials: None,
            epoch: 0,
            reader: None,
            retired: None,
            writer: None,
            timers: Scheduler::new(),
            reconnect_timer: None,
            keepalive_timer: None,
            last_activity: None,
            connected_since: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn status(&self) -> ConnectionStatus {
        ConnectionStatus {
            state: self.state,
            attempt: self.backoff.attempts(),
            current_delay: self.backoff.current_delay(),
            last_activity: self.last_activity,
            connected_since: self.connected_since,
        }
    }

    /// Channel joined by the current credentials.
    pub fn channel(&self) -> Option<&str> {
        self.credentials.as_ref().map(Credentials::channel)
    }

    /// Start connecting with `credentials`.
    ///
    /// Fails if a connection is already up or being pursued. A previous
    /// `Failed` or `Disconnected` session is replaced.
    pub fn connect(&mut self, credentials: Credentials, now: Instant) -> Result<(), ConnectError> {
        if self.state.is_active() {
            return Err(ConnectError::AlreadyActive { state: self.state });
        }
        info!(
            host = %self.settings.target.host,
            port = self.settings.target.port,
            nick = %credentials.nick(),
            channel = %credentials.channel(),
            "Connecting"
        );
        self.credentials = Some(credentials);
        self.backoff.reset();
        self.start_attempt(now)
    }

    /// Drop the connection.
    ///
    /// With `reconnect`, the socket is closed and the normal backoff path
    /// takes over. Without it, the manager stops in `Disconnected`.
    pub fn disconnect(&mut self, reconnect: bool, now: Instant) {
        if reconnect {
            match self.state {
                ConnectionState::Connecting | ConnectionState::Connected => {
                    info!("Disconnect requested; reconnecting");
                    self.teardown();
                    self.schedule_retry(now);
                }
                ConnectionState::Reconnecting => {}
                ConnectionState::Disconnected | ConnectionState::Failed => {
                    match self.credentials.clone() {
                        Some(credentials) => {
                            if let Err(e) = self.connect(credentials, now) {
                                warn!(error = %e, "Reconnect request failed");
                            }
                        }
                        None => warn!("Reconnect requested before any connect; ignoring"),
                    }
                }
            }
            return;
        }

        if self.state != ConnectionState::Disconnected {
            info!(from = %self.state, "Disconnected by request");
        }
        self.teardown();
        self.cancel_reconnect();
        self.timers.clear();
        self.state = ConnectionState::Disconnected;
    }

    /// Write one command. Only allowed while `Connected`.
    ///
    /// A write failure is treated as a lost connection.
    pub fn send(&mut self, command: &Command, now: Instant) -> Result<(), SendError> {
        if self.state != ConnectionState::Connected {
            return Err(SendError::NotConnected(self.state));
        }
        let Some(writer) = self.writer.as_mut() else {
            return Err(SendError::NotConnected(self.state));
        };
        match handshake::write_command(writer, command) {
            Ok(()) => Ok(()),
            Err(e) => {
                let reason = format!("write failed: {e}");
                self.connection_lost(&reason, now);
                Err(SendError::Io(e))
            }
        }
    }

    /// Apply one reader event. Returns the line when the event carries one
    /// for the current connection.
    pub fn handle_event(&mut self, item: WorkItem, now: Instant) -> Option<String> {
        if item.epoch != self.epoch {
            if let ReaderEvent::Established(stream) = item.event {
                let _ = stream.shutdown(Shutdown::Both);
            }
            debug!(epoch = item.epoch, current = self.epoch, "Dropped stale reader event");
            return None;
        }

        match item.event {
            ReaderEvent::Established(stream) => {
                self.on_established(stream, now);
                None
            }
            ReaderEvent::ConnectFailed(e) => {
                warn!(code = e.error_code(), error = %e, "Connect attempt failed");
                self.reader = None;
                self.schedule_retry(now);
                None
            }
            ReaderEvent::Line(line) => {
                self.last_activity = Some(now);
                Some(line)
            }
            ReaderEvent::ConnectionLost(reason) => {
                // The reader has already exited.
                self.reader = None;
                self.connection_lost(&reason, now);
                None
            }
        }
    }

    /// Fire due reconnect and keep-alive timers.
    pub fn poll_timers(&mut self, now: Instant) {
        for timer in self.timers.take_due(now) {
            match timer {
                ConnTimer::Reconnect => {
                    self.reconnect_timer = None;
                    if self.state == ConnectionState::Reconnecting {
                        info!(attempt = self.backoff.attempts(), "Reconnecting");
                        if let Err(e) = self.start_attempt(now) {
                            warn!(error = %e, "Reconnect attempt could not start");
                        }
                    }
                }
                ConnTimer::KeepAlive => {
                    self.keepalive_timer = None;
                    if self.state == ConnectionState::Connected {
                        self.keepalive(now);
                    }
                }
            }
        }
    }

    /// Treat the current connection as broken and enter the backoff path.
    pub fn connection_lost(&mut self, reason: &str, now: Instant) {
        if !matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Connected
        ) {
            return;
        }
        warn!(reason = %reason, from = %self.state, "Connection lost");
        self.teardown();
        self.schedule_retry(now);
    }

    /// The server asked for a reconnect.
    pub fn server_reconnect(&mut self, now: Instant) {
        if self.state != ConnectionState::Connected {
            return;
        }
        info!("Server requested reconnect");
        self.teardown();
        self.backoff.reset();
        self.schedule_retry(now);
    }

    /// Stop for good: retrying cannot succeed.
    pub fn fail(&mut self, reason: &str) {
        self.teardown();
        self.cancel_reconnect();
        self.timers.clear();
        self.state = ConnectionState::Failed;
        error!(fatal = true, reason = %reason, "Connection failed permanently");
    }

    fn start_attempt(&mut self, now: Instant) -> Result<(), ConnectError> {
        if self.retired.as_ref().is_some_and(|old| !old.is_finished()) {
            debug!("Previous reader still running; deferring connect");
            self.state = ConnectionState::Reconnecting;
            self.cancel_reconnect();
            self.reconnect_timer =
                Some(self.timers.run_after(now, RETIRED_READER_POLL, ConnTimer::Reconnect));
            return Ok(());
        }
        self.retired = None;
        self.epoch += 1;
        self.state = ConnectionState::Connecting;
        match reader::spawn(self.epoch, self.settings.target.clone(), self.queue.clone()) {
            Ok(handle) => {
                self.reader = Some(handle);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Could not start reader thread");
                self.schedule_retry(now);
                Err(ConnectError::Spawn(e))
            }
        }
    }

    fn on_established(&mut self, mut stream: TcpStream, now: Instant) {
        if self.state != ConnectionState::Connecting {
            let _ = stream.shutdown(Shutdown::Both);
            return;
        }
        let Some(credentials) = self.credentials.as_ref() else {
            let _ = stream.shutdown(Shutdown::Both);
            self.fail("socket opened without credentials");
            return;
        };

        let _ = stream.set_write_timeout(Some(self.settings.target.connect_timeout));
        if let Err(e) = handshake::perform(&mut stream, credentials, &self.settings.capabilities) {
            let _ = stream.shutdown(Shutdown::Both);
            let reason = format!("handshake write failed: {e}");
            self.connection_lost(&reason, now);
            return;
        }

        info!(
            channel = %credentials.channel(),
            epoch = self.epoch,
            "Connected"
        );
        self.writer = Some(stream);
        self.state = ConnectionState::Connected;
        self.backoff.reset();
        self.last_activity = Some(now);
        self.connected_since = Some(Utc::now());
        self.schedule_keepalive(now);
    }

    fn keepalive(&mut self, now: Instant) {
        let idle = self
            .last_activity
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        if idle > self.settings.idle_timeout {
            let reason = format!("no traffic for {}s", idle.as_secs());
            self.connection_lost(&reason, now);
            return;
        }

        let ping = Command::Ping(self.settings.target.host.clone());
        if self.send(&ping, now).is_ok() {
            self.schedule_keepalive(now);
        }
    }

    fn schedule_keepalive(&mut self, now: Instant) {
        if let Some(handle) = self.keepalive_timer.take() {
            self.timers.cancel(handle);
        }
        self.keepalive_timer =
            Some(self.timers.run_after(now, self.settings.keepalive_interval, ConnTimer::KeepAlive));
    }

    fn schedule_retry(&mut self, now: Instant) {
        match self.backoff.next_delay() {
            Some(delay) => {
                self.state = ConnectionState::Reconnecting;
                self.cancel_reconnect();
                self.reconnect_timer = Some(self.timers.run_after(now, delay, ConnTimer::Reconnect));
                info!(
                    attempt = self.backoff.attempts(),
                    delay_ms = delay.as_millis() as u64,
                    "Reconnect scheduled"
                );
            }
            None => {
                let reason = format!(
                    "gave up after {} reconnect attempts",
                    self.backoff.policy().max_attempts
                );
                self.fail(&reason);
            }
        }
    }

    fn cancel_reconnect(&mut self) {
        if let Some(handle) = self.reconnect_timer.take() {
            self.timers.cancel(handle);
        }
    }

    /// Release the socket and reader and stop the keep-alive. Bumps the
    /// epoch so anything the old reader already queued is ignored.
    fn teardown(&mut self) {
        if let Some(handle) = self.keepalive_timer.take() {
            self.timers.cancel(handle);
        }
        if let Some(reader) = self.reader.take() {
            reader.cancel();
            self.retired = Some(reader);
        }
        if let Some(writer) = self.writer.take() {
            let _ = writer.shutdown(Shutdown::Both);
        }
        self.connected_since = None;
        self.last_activity = None;
        self.epoch += 1;
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.teardown();
    }
}
