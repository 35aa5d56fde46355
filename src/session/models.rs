/*!
 * Notifications the exercise session raises for UI layers.
 */

use serde::Serialize;

use crate::exercise::GapStatus;

/// A change UI layers may want to react to
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionNotification {
    /// A segment became the exercise segment (again)
    ExercisePublished { segment_id: String },
    /// The exercise segment was dropped
    ExerciseCleared,
    GapStatusChanged {
        segment_id: String,
        index: usize,
        status: GapStatus,
    },
    /// Move input focus to this gap
    FocusGap { segment_id: String, index: usize },
    /// The session paused the video for an exercise
    PlaybackPaused,
    /// All gaps are done and playback continues
    PlaybackResumed,
    ReplayStarted { segment_id: String },
    /// The replay reached the segment end (or was superseded)
    ReplayFinished { segment_id: String },
}
