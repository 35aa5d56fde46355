/*!
 * Error types for the lingo-gapfy engine.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions:
 * - `HostError`: failures reported by the host page collaborators
 * - `ReplayError`: replay failures that must reach the caller
 * - `TranscriptError`: SRT transcript loading failures for the drill
 * - `AppError`: umbrella error for the binary
 */

use std::fmt;

use thiserror::Error;

/// Host page surfaces the engine depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// The main video element
    Video,
    /// The container the host renders captions into
    CaptionContainer,
    /// The button toggling the host's own captions
    CaptionToggle,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "video element",
            Self::CaptionContainer => "caption container",
            Self::CaptionToggle => "caption toggle button",
        };
        write!(f, "{}", name)
    }
}

/// Errors reported by the host page
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    /// The surface could not be located on the page
    #[error("{0} is not available")]
    Unavailable(Surface),

    /// The video refused a playback position
    #[error("Invalid playback time: {0}")]
    InvalidTime(f64),

    /// The platform rejected a play request (autoplay policy and similar)
    #[error("Playback rejected: {0}")]
    PlaybackRejected(String),
}

/// Errors that can occur while starting a replay
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReplayError {
    /// The video refused the computed seek target, which means the segment
    /// data feeding the replay is corrupted
    #[error("Failed to seek to replay start for {segment_id}: {source}")]
    Seek {
        /// Segment being replayed
        segment_id: String,
        /// Underlying host failure
        #[source]
        source: HostError,
    },
}

/// Errors that can occur while loading a transcript
#[derive(Error, Debug)]
pub enum TranscriptError {
    /// The transcript file could not be read
    #[error("Failed to read transcript: {0}")]
    Io(#[from] std::io::Error),

    /// The transcript did not contain a single usable cue
    #[error("Transcript contains no usable cues")]
    Empty,
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the host page
    #[error("Host error: {0}")]
    Host(#[from] HostError),

    /// Error from a replay
    #[error("Replay error: {0}")]
    Replay(#[from] ReplayError),

    /// Error from transcript loading
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
