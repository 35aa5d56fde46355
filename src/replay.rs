/*!
 * Replay controller.
 *
 * After a wrong answer the video is sent back to just before the segment
 * start and played until the segment end, so the learner hears the line
 * again. Captions rendered during a replay are ignored by the observer.
 */

use std::fmt;

use log::{debug, trace, warn};

use crate::capture::CaptionObserver;
use crate::errors::ReplayError;
use crate::exercise::ExerciseStore;
use crate::host::{EventSource, HostPage, SubscriptionId};
use crate::segment::{EarliestStartMemory, Segment};

// How close a seek must land to the replay target to count as the replay's own
const OWN_SEEK_EPSILON: f64 = 0.05;

/// Why a replay request did nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No known segment carries the id
    UnknownSegment,
    /// The page has no video element
    NoVideo,
    /// The segment does not end after it starts
    EmptyRange,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Self::UnknownSegment => "unknown segment",
            Self::NoVideo => "no video",
            Self::EmptyRange => "empty time range",
        };
        write!(f, "{}", reason)
    }
}

/// Result of a replay request
#[derive(Debug, Clone, PartialEq)]
pub enum ReplayOutcome {
    Started {
        segment_id: String,
        /// Position the video was sent to
        seek_to: f64,
        /// Position at which playback pauses again
        until: f64,
    },
    Skipped(SkipReason),
}

impl ReplayOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started { .. })
    }
}

#[derive(Debug)]
pub struct ReplayController {
    lead_in: f64,
    active: bool,
    listener: Option<SubscriptionId>,
    seek_to: f64,
    until: f64,
    segment_id: Option<String>,
}

impl Default for ReplayController {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl ReplayController {
    /// Controller rewinding `lead_in` seconds before a segment start
    pub fn new(lead_in: f64) -> Self {
        Self {
            lead_in,
            active: false,
            listener: None,
            seek_to: 0.0,
            until: 0.0,
            segment_id: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Segment being replayed, if any
    pub fn segment_id(&self) -> Option<&str> {
        self.segment_id.as_deref().filter(|_| self.active)
    }

    pub fn owns(&self, subscription: SubscriptionId) -> bool {
        self.listener == Some(subscription)
    }

    /// A seek landing at `position` is the one this replay issued
    pub fn is_own_seek(&self, position: f64) -> bool {
        self.active && (position - self.seek_to).abs() <= OWN_SEEK_EPSILON
    }

    /// Seek back to a segment and play it again.
    ///
    /// The segment is looked up in the exercise store first, then among the
    /// captured segments. On success it becomes the exercise segment.
    pub fn start<H: HostPage>(
        &mut self,
        host: &mut H,
        segment_id: &str,
        store: &mut ExerciseStore,
        observer: &CaptionObserver,
        memory: &EarliestStartMemory,
    ) -> Result<ReplayOutcome, ReplayError> {
        let Some(segment) = find_segment(segment_id, store, observer) else {
            debug!("Replay skipped: segment {} not found", segment_id);
            return Ok(ReplayOutcome::Skipped(SkipReason::UnknownSegment));
        };

        if !host.has_video() {
            warn!("Replay skipped: no video element");
            return Ok(ReplayOutcome::Skipped(SkipReason::NoVideo));
        }

        let start = memory.lookup(&segment.text).unwrap_or(segment.start_time);
        let end = segment
            .end_time
            .or_else(|| host.current_time().ok())
            .unwrap_or(start);

        if end <= start {
            debug!(
                "Replay skipped: segment {} spans {:.3}s - {:.3}s",
                segment.id, start, end
            );
            return Ok(ReplayOutcome::Skipped(SkipReason::EmptyRange));
        }

        self.remove_listener(host);
        let listener = match host.subscribe(EventSource::VideoTimeUpdate) {
            Ok(listener) => listener,
            Err(e) => {
                warn!("Replay skipped: {}", e);
                return Ok(ReplayOutcome::Skipped(SkipReason::NoVideo));
            }
        };
        self.listener = Some(listener);
        store.publish_segment(segment.clone());

        let seek_to = not_below_zero(start - self.lead_in);
        if let Err(source) = host.set_current_time(seek_to) {
            self.remove_listener(host);
            return Err(ReplayError::Seek {
                segment_id: segment.id,
                source,
            });
        }

        self.active = true;
        self.seek_to = seek_to;
        self.until = end;
        self.segment_id = Some(segment.id.clone());
        debug!(
            "Replaying {} from {:.3}s until {:.3}s",
            segment.id, seek_to, end
        );

        if let Err(e) = host.play() {
            warn!("Video play failed during replay: {}", e);
        }

        Ok(ReplayOutcome::Started {
            segment_id: segment.id,
            seek_to,
            until: end,
        })
    }

    /// Handle a time update. Returns true when the replay just ended.
    pub fn on_time_update<H: HostPage>(&mut self, host: &mut H) -> bool {
        if !self.active {
            return false;
        }
        let Ok(now) = host.current_time() else {
            return false;
        };
        if now < self.until {
            trace!("Replay at {:.3}s of {:.3}s", now, self.until);
            return false;
        }

        if let Err(e) = host.pause() {
            warn!("Video pause failed after replay: {}", e);
        }
        debug!("Replay reached {:.3}s", self.until);
        self.cancel(host);
        true
    }

    /// End the replay session and drop its listener
    pub fn cancel<H: HostPage>(&mut self, host: &mut H) {
        self.remove_listener(host);
        self.active = false;
        self.segment_id = None;
    }

    fn remove_listener<H: HostPage>(&mut self, host: &mut H) {
        if let Some(listener) = self.listener.take() {
            host.unsubscribe(listener);
        }
    }
}

fn find_segment(segment_id: &str, store: &ExerciseStore, observer: &CaptionObserver) -> Option<Segment> {
    store
        .segment()
        .filter(|segment| segment.id == segment_id)
        .or_else(|| observer.find(segment_id))
        .cloned()
}

// NaN passes through so the host can refuse it
fn not_below_zero(seconds: f64) -> f64 {
    if seconds < 0.0 { 0.0 } else { seconds }
}
