/*!
 * Seek guard.
 *
 * A user scrubbing away from the segment being practised abandons the
 * exercise. The guard only watches; the session decides what to clear.
 */

use log::debug;

use crate::host::{EventSource, HostPage, SubscriptionId};
use crate::segment::Segment;

#[derive(Debug)]
pub struct SeekGuard {
    tolerance: f64,
    subscription: Option<SubscriptionId>,
}

impl Default for SeekGuard {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl SeekGuard {
    /// Guard accepting seeks up to `tolerance` seconds outside a segment
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            subscription: None,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Subscribe to seeking events. Returns false without a video element.
    pub fn install<H: HostPage>(&mut self, host: &mut H) -> bool {
        self.uninstall(host);
        match host.subscribe(EventSource::VideoSeeking) {
            Ok(subscription) => {
                self.subscription = Some(subscription);
                true
            }
            Err(e) => {
                debug!("Seek guard not installed: {}", e);
                false
            }
        }
    }

    pub fn uninstall<H: HostPage>(&mut self, host: &mut H) {
        if let Some(subscription) = self.subscription.take() {
            host.unsubscribe(subscription);
        }
    }

    pub fn is_installed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn owns(&self, subscription: SubscriptionId) -> bool {
        self.subscription == Some(subscription)
    }

    /// Whether `position` lies outside the segment widened by the tolerance.
    /// An open segment is treated as ending where it starts.
    pub fn is_outside(&self, segment: &Segment, position: f64) -> bool {
        let start = segment.start_time;
        let end = segment.end_time.unwrap_or(start);
        position < start - self.tolerance || position > end + self.tolerance
    }
}
