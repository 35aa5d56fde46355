/*!
 * Tests for clearing the exercise when the learner seeks away
 */

use lingo_gapfy::exercise::GapStatus;
use lingo_gapfy::host::EventSource;
use lingo_gapfy::session::SessionNotification;

use crate::common::{TWO_GAPS, seek_to, session_with_exercise, show_caption_at, started_session};

#[test]
fn test_seek_withinTolerance_shouldKeepExercise() {
    for position in [4.0, 5.5, 8.0] {
        let mut session = session_with_exercise(TWO_GAPS, 5.0, 7.0);

        seek_to(&mut session, position);

        assert_eq!(
            session.exercise_segment().map(|s| s.id.as_str()),
            Some("segment-5000"),
            "seek to {} should keep the exercise",
            position
        );
    }
}

#[test]
fn test_seek_outsideTolerance_shouldClearEverything() {
    for position in [3.0, 9.0] {
        let mut session = session_with_exercise(TWO_GAPS, 5.0, 7.0);
        session.validate_gap("segment-5000", 0, "world", "world").unwrap();
        session.drain_notifications();

        seek_to(&mut session, position);

        assert!(session.exercise_segment().is_none(), "seek to {}", position);
        assert!(session.active_segment().is_none());
        assert!(session.previous_segment().is_none());
        assert_eq!(session.gap_status("segment-5000", 0), GapStatus::Default);
        assert_eq!(
            session.drain_notifications(),
            vec![SessionNotification::ExerciseCleared]
        );
        assert!(session.is_active());
    }
}

#[test]
fn test_seek_withoutExercise_shouldDoNothing() {
    let mut session = started_session();
    show_caption_at(&mut session, TWO_GAPS, 1.0);

    seek_to(&mut session, 50.0);

    assert!(session.active_segment().is_some());
    assert!(session.drain_notifications().is_empty());
}

#[test]
fn test_seek_afterClear_shouldLetSegmentBePractisedAgain() {
    let mut session = session_with_exercise(TWO_GAPS, 5.0, 7.0);
    seek_to(&mut session, 1.0);

    show_caption_at(&mut session, TWO_GAPS, 5.0);
    show_caption_at(&mut session, "Next line follows", 7.0);

    assert_eq!(session.exercise_segment().unwrap().id, "segment-5000");
    assert_eq!(session.host().pause_calls, 2);
}

#[test]
fn test_seekGuard_shouldBeRemovedOnStop() {
    let mut session = session_with_exercise(TWO_GAPS, 5.0, 7.0);

    session.stop();

    assert!(session.host().subscriptions_for(EventSource::VideoSeeking).is_empty());
}
