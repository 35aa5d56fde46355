/*!
 * Tests for error types and conversions
 */

use std::error::Error;

use lingo_gapfy::errors::{AppError, HostError, ReplayError, Surface, TranscriptError};

#[test]
fn test_hostError_unavailable_shouldNameSurface() {
    let error = HostError::Unavailable(Surface::CaptionContainer);
    assert_eq!(error.to_string(), "caption container is not available");

    let error = HostError::Unavailable(Surface::CaptionToggle);
    assert!(error.to_string().contains("caption toggle button"));
}

#[test]
fn test_hostError_invalidTime_shouldDisplayValue() {
    let error = HostError::InvalidTime(-3.5);
    assert!(error.to_string().contains("-3.5"));
}

#[test]
fn test_replayError_seek_shouldExposeHostSource() {
    let error = ReplayError::Seek {
        segment_id: "segment-1000".to_string(),
        source: HostError::InvalidTime(f64::NAN),
    };

    let display = error.to_string();
    assert!(display.contains("segment-1000"));
    assert!(display.contains("NaN"));
    assert!(error.source().is_some());
}

#[test]
fn test_transcriptError_fromIo_shouldConvert() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "lesson.srt");
    let error: TranscriptError = io_error.into();

    assert!(matches!(error, TranscriptError::Io(_)));
    assert!(error.to_string().contains("Failed to read transcript"));
}

#[test]
fn test_appError_conversions_shouldWrapLayerErrors() {
    let error: AppError = HostError::PlaybackRejected("autoplay blocked".to_string()).into();
    assert!(matches!(error, AppError::Host(_)));
    assert!(error.to_string().contains("autoplay blocked"));

    let error: AppError = TranscriptError::Empty.into();
    assert!(matches!(error, AppError::Transcript(TranscriptError::Empty)));

    let error: AppError = std::io::Error::other("disk full").into();
    assert!(matches!(error, AppError::File(_)));

    let error: AppError = anyhow::anyhow!("something odd").into();
    assert_eq!(error.to_string(), "Unknown error: something odd");
}
