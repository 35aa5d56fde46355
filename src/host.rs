/*!
 * Host page collaborator interface.
 *
 * The engine never touches the page directly. Everything it needs from the
 * video element, the caption renderer and the caption toggle goes through
 * the `HostPage` trait, and everything the page wants to tell the engine
 * arrives as a `HostEvent` passed to `ExerciseSession::dispatch`.
 *
 * Notifications are edge-triggered: the host delivers one `Notify` per
 * batch of changes for every live subscription of the matching source, in
 * no particular order relative to other sources.
 */

use std::fmt;
use std::time::Duration;

pub use crate::errors::{HostError, Surface};

/// Handle for a live event subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle for a pending one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(pub u64);

/// Identity of a caption node on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

/// Event streams the engine can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventSource {
    /// Any change below the caption container
    CaptionMutations,
    /// The enabled attribute of the caption toggle changed
    CaptionToggleAttribute,
    /// Periodic playback position updates
    VideoTimeUpdate,
    /// The video started seeking
    VideoSeeking,
}

impl EventSource {
    /// Surface that has to exist for a subscription to succeed
    pub fn surface(self) -> Surface {
        match self {
            Self::CaptionMutations => Surface::CaptionContainer,
            Self::CaptionToggleAttribute => Surface::CaptionToggle,
            Self::VideoTimeUpdate | Self::VideoSeeking => Surface::Video,
        }
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CaptionMutations => "caption mutations",
            Self::CaptionToggleAttribute => "caption toggle attribute",
            Self::VideoTimeUpdate => "timeupdate",
            Self::VideoSeeking => "seeking",
        };
        write!(f, "{}", name)
    }
}

/// Notification delivered by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The subscription's source fired
    Notify(SubscriptionId),
    /// A timer elapsed
    Timer(TimerId),
}

/// The trailing caption node currently rendered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionNode {
    pub node: NodeId,
    pub text: String,
}

/// How much media data the video has buffered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

/// Everything the engine needs from the page hosting the video
pub trait HostPage {
    // Video control surface

    /// Current playback position in seconds
    fn current_time(&self) -> Result<f64, HostError>;

    /// Move the playback position; non-finite values are refused
    fn set_current_time(&mut self, seconds: f64) -> Result<(), HostError>;

    /// Request playback; the platform may reject it
    fn play(&mut self) -> Result<(), HostError>;

    fn pause(&mut self) -> Result<(), HostError>;

    fn ready_state(&self) -> Result<ReadyState, HostError>;

    // Caption surface

    /// Last caption node inside the caption container, `Ok(None)` when the
    /// container is present but empty
    fn last_caption(&self) -> Result<Option<CaptionNode>, HostError>;

    /// Whether the host's own captions are switched on
    fn native_captions_enabled(&self) -> Result<bool, HostError>;

    // Page chrome

    /// Show or hide the overlay controls drawn over the top of the video
    fn set_overlay_visible(&mut self, visible: bool);

    /// Show or hide the host's caption rendering
    fn set_native_captions_visible(&mut self, visible: bool);

    /// Switch the host's captions on and lock the toggle
    fn enable_native_captions(&mut self) -> Result<(), HostError>;

    /// Give the toggle back to the user
    fn restore_caption_toggle(&mut self);

    // Notifications

    fn subscribe(&mut self, source: EventSource) -> Result<SubscriptionId, HostError>;

    /// Removing an unknown or already removed subscription is a no-op
    fn unsubscribe(&mut self, id: SubscriptionId);

    fn set_timeout(&mut self, delay: Duration) -> TimerId;

    /// Clearing an unknown or already fired timer is a no-op
    fn clear_timeout(&mut self, id: TimerId);

    /// Whether a video element is present
    fn has_video(&self) -> bool {
        self.current_time().is_ok()
    }
}
