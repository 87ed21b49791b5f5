//! Consumer-side plumbing: the handoff queue the reader threads feed and the
//! timer wheel driven by the same tick that drains it.

mod queue;
mod scheduler;

pub use queue::{DepthMonitor, HandoffQueue};
pub use scheduler::{Scheduler, TimerHandle};
