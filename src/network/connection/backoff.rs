//! Reconnect backoff: [`ReconnectPolicy`] and its running state [`Backoff`].

use std::time::Duration;

/// How reconnect attempts are spaced and when to give up.
///
/// ```text
/// initial_delay = 1s, backoff_factor = 2.0, max_delay = 5s, max_attempts = 4
///
/// Attempt 1: wait 1s
/// Attempt 2: wait 2s
/// Attempt 3: wait 4s
/// Attempt 4: wait 5s (capped)
/// Exhausted → Failed
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Multiplier applied to the delay after each failed attempt.
    pub backoff_factor: f64,
    /// Cap on delay growth.
    pub max_delay: Duration,
    /// Retries before giving up. `0` means fail on the first loss.
    pub max_attempts: u32,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(60),
            max_attempts: 10,
        }
    }
}

/// Backoff progress for the current outage.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    attempts: u32,
    next: Duration,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        let next = policy.initial_delay.min(policy.max_delay);
        Self {
            policy,
            attempts: 0,
            next,
        }
    }

    /// Count one more attempt and return how long to wait before it, or
    /// `None` once the attempt budget is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.policy.max_attempts {
            return None;
        }
        self.attempts += 1;
        let delay = self.next;
        self.next = Duration::try_from_secs_f64(delay.as_secs_f64() * self.policy.backoff_factor)
            .unwrap_or(self.policy.max_delay)
            .clamp(delay, self.policy.max_delay.max(delay));
        Some(delay)
    }

    /// Forget the current outage after a successful handshake.
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.next = self.policy.initial_delay.min(self.policy.max_delay);
    }

    /// Attempts counted since the last reset.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Delay the next attempt would use.
    pub fn current_delay(&self) -> Duration {
        self.next
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }
}
