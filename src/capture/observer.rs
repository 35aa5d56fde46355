/*!
 * Caption observer.
 *
 * Rebuilds timed segments from the host's caption renderer. The host keeps a
 * rolling window of caption nodes and only the trailing node is live; words
 * are streamed into that node, and whole nodes are re-created both when a new
 * line starts and, cosmetically, for no reason at all. Two signals tell
 * these cases apart: whether the trailing node is a different node than last
 * time, and whether its trimmed text changed.
 */

use log::{debug, trace};

use crate::errors::HostError;
use crate::host::{EventSource, HostPage, NodeId, SubscriptionId};
use crate::segment::{EarliestStartMemory, Segment};

/// What a mutation notification did to the captured segments
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureUpdate {
    /// Notification dropped (replay running, nothing rendered, blank text)
    Ignored,
    /// Nothing relevant changed
    Unchanged,
    /// The same text was re-rendered into a fresh node
    NodeRecreated,
    /// More words were streamed into the live node
    Extended(Segment),
    /// A first segment started with nothing to seal
    Started(Segment),
    /// A new segment started and the previous active one was sealed
    Sealed { previous: Segment, active: Segment },
}

/// Tracks the live caption node and the segments built from it
#[derive(Debug, Default)]
pub struct CaptionObserver {
    subscription: Option<SubscriptionId>,
    last_node: Option<NodeId>,
    last_text: Option<String>,
    active: Option<Segment>,
    // Playback time the active segment was first seen, before memory lookup
    observed_start: Option<f64>,
    previous: Option<Segment>,
}

impl CaptionObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the caption container, replacing any earlier attachment
    pub fn start<H: HostPage>(&mut self, host: &mut H) -> Result<(), HostError> {
        self.stop(host);
        let subscription = host.subscribe(EventSource::CaptionMutations)?;
        debug!("Caption capture attached ({:?})", subscription);
        self.subscription = Some(subscription);
        Ok(())
    }

    /// Detach and forget the tracked node. Segments and the earliest-start
    /// memory survive.
    pub fn stop<H: HostPage>(&mut self, host: &mut H) {
        if let Some(subscription) = self.subscription.take() {
            host.unsubscribe(subscription);
            debug!("Caption capture detached ({:?})", subscription);
        }
        self.last_node = None;
        self.last_text = None;
    }

    pub fn is_capturing(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn owns(&self, subscription: SubscriptionId) -> bool {
        self.subscription == Some(subscription)
    }

    /// The growing segment currently on screen
    pub fn active(&self) -> Option<&Segment> {
        self.active.as_ref()
    }

    /// The last sealed segment
    pub fn previous(&self) -> Option<&Segment> {
        self.previous.as_ref()
    }

    /// Captured segment with the given id, active first
    pub fn find(&self, segment_id: &str) -> Option<&Segment> {
        self.active
            .iter()
            .chain(self.previous.iter())
            .find(|segment| segment.id == segment_id)
    }

    pub fn clear_segments(&mut self) {
        self.active = None;
        self.observed_start = None;
        self.previous = None;
    }

    /// Handle one mutation notification
    pub fn on_mutation<H: HostPage>(
        &mut self,
        host: &H,
        memory: &mut EarliestStartMemory,
        replay_active: bool,
    ) -> CaptureUpdate {
        if replay_active {
            trace!("Replay in progress, caption mutation ignored");
            return CaptureUpdate::Ignored;
        }

        let caption = match host.last_caption() {
            Ok(Some(caption)) => caption,
            Ok(None) => return CaptureUpdate::Ignored,
            Err(e) => {
                debug!("Caption mutation without readable captions: {}", e);
                return CaptureUpdate::Ignored;
            }
        };

        let text = caption.text.trim();
        if text.is_empty() {
            return CaptureUpdate::Ignored;
        }

        let recreated = self.last_node != Some(caption.node);
        let changed = self.last_text.as_deref() != Some(text);
        self.last_node = Some(caption.node);

        match (recreated, changed) {
            (true, true) => {
                self.last_text = Some(text.to_string());
                let now = current_time(host);
                let sealed = self.active.take().map(|active| {
                    // the full text is only known now, resolve it against the
                    // time the line was actually seen
                    let observed = self.observed_start.unwrap_or(active.start_time);
                    let end = now.max(observed);
                    memory.resolve(&active.text, observed).sealed_at(end)
                });
                let active = memory.resolve(text, now);
                debug!("New caption segment {} at {:.3}s: '{}'", active.id, now, text);
                self.active = Some(active.clone());
                self.observed_start = Some(now);

                match sealed {
                    Some(previous) => {
                        debug!(
                            "Sealed segment {} ({:.3}s - {:.3}s)",
                            previous.id,
                            previous.start_time,
                            previous.end_time.unwrap_or(previous.start_time)
                        );
                        self.previous = Some(previous.clone());
                        CaptureUpdate::Sealed { previous, active }
                    }
                    None => CaptureUpdate::Started(active),
                }
            }
            (false, true) => {
                self.last_text = Some(text.to_string());
                let extended = match self.observed_start {
                    // streamed prefixes are not remembered, only whole lines
                    Some(observed) if self.active.is_some() => provisional(memory, text, observed),
                    _ => {
                        let now = current_time(host);
                        self.observed_start = Some(now);
                        memory.resolve(text, now)
                    }
                };
                trace!("Caption segment {} now reads '{}'", extended.id, text);
                self.active = Some(extended.clone());
                CaptureUpdate::Extended(extended)
            }
            (true, false) => {
                trace!("Caption node re-created with unchanged text");
                CaptureUpdate::NodeRecreated
            }
            (false, false) => CaptureUpdate::Unchanged,
        }
    }
}

// Identity of a growing line without recording its partial text
fn provisional(memory: &EarliestStartMemory, text: &str, observed: f64) -> Segment {
    let start = memory
        .lookup(text)
        .map_or(observed, |known| known.min(observed));
    Segment::new(text, start)
}

fn current_time<H: HostPage>(host: &H) -> f64 {
    match host.current_time() {
        Ok(time) => time,
        Err(e) => {
            debug!("No playback position for caption timing: {}", e);
            0.0
        }
    }
}
