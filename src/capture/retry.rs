/*!
 * Deferred capture work.
 *
 * Attaching to the caption container can fail while the host page is still
 * building its player, and a user switching native captions back on forces
 * a detach and re-attach. Both are deferred through host timers; this module
 * keeps track of which pending timer means what.
 */

use std::collections::HashMap;
use std::time::Duration;

use log::trace;

use crate::host::{HostPage, TimerId};

/// Bounded retry schedule for attaching caption capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included
    pub max_attempts: u32,
    /// Pause between two attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt follows a failed `attempt` (1-based)
    pub fn allows_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Work scheduled behind a host timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTimer {
    /// Try attaching again; `attempt` is the 1-based number of that try
    Retry { attempt: u32 },
    /// Re-hide native captions and re-attach after a toggle
    ToggleRestart,
}

/// Pending capture timers keyed by host timer id
#[derive(Debug, Default)]
pub struct CaptureTimers {
    pending: HashMap<TimerId, CaptureTimer>,
}

impl CaptureTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule<H: HostPage>(&mut self, host: &mut H, delay: Duration, work: CaptureTimer) -> TimerId {
        let id = host.set_timeout(delay);
        trace!("Scheduled {:?} as {:?} in {:?}", work, id, delay);
        self.pending.insert(id, work);
        id
    }

    /// Claim the work behind an elapsed timer. Unknown ids yield `None`.
    pub fn take(&mut self, id: TimerId) -> Option<CaptureTimer> {
        self.pending.remove(&id)
    }

    pub fn cancel_all<H: HostPage>(&mut self, host: &mut H) {
        for (id, _) in self.pending.drain() {
            host.clear_timeout(id);
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
