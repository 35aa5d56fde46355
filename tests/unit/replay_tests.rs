/*!
 * Tests for replaying a segment after a wrong answer
 */

use lingo_gapfy::errors::{HostError, ReplayError};
use lingo_gapfy::exercise::GapStatus;
use lingo_gapfy::host::EventSource;
use lingo_gapfy::replay::{ReplayOutcome, SkipReason};
use lingo_gapfy::session::{ExerciseSession, SessionNotification};

use crate::common::mock_host::MockHost;
use crate::common::{
    NO_GAPS, TWO_GAPS, fire, seek_to, session_with_exercise, show_caption_at, started_session, time_update,
};

#[test]
fn test_startReplay_shouldSeekBeforeStartAndPlay() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);
    let plays = session.host().play_calls;

    let outcome = session.start_replay("segment-2000").unwrap();

    assert_eq!(
        outcome,
        ReplayOutcome::Started {
            segment_id: "segment-2000".to_string(),
            seek_to: 1.5,
            until: 5.0,
        }
    );
    assert_eq!(session.host().seeks, vec![1.5]);
    assert_eq!(session.host().play_calls, plays + 1);
    assert!(session.is_replaying());
    assert_eq!(
        session.drain_notifications(),
        vec![
            SessionNotification::ExercisePublished {
                segment_id: "segment-2000".to_string()
            },
            SessionNotification::ReplayStarted {
                segment_id: "segment-2000".to_string()
            },
        ]
    );
}

#[test]
fn test_timeUpdate_atSegmentEnd_shouldPauseOnceAndFinish() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);
    session.start_replay("segment-2000").unwrap();
    let pauses = session.host().pause_calls;

    time_update(&mut session, 4.9);
    assert!(session.is_replaying());
    assert_eq!(session.host().pause_calls, pauses);

    time_update(&mut session, 5.0);
    assert!(!session.is_replaying());
    assert_eq!(session.host().pause_calls, pauses + 1);
    assert!(session
        .host()
        .subscriptions_for(EventSource::VideoTimeUpdate)
        .is_empty());

    // the listener is gone, later updates change nothing
    time_update(&mut session, 6.0);
    assert_eq!(session.host().pause_calls, pauses + 1);
}

#[test]
fn test_startReplay_nearZero_shouldClampSeekTarget() {
    let mut session = session_with_exercise(TWO_GAPS, 0.3, 2.0);

    session.start_replay("segment-300").unwrap();

    assert_eq!(session.host().seeks, vec![0.0]);
}

#[test]
fn test_startReplay_shouldUseEarliestRememberedStart() {
    let mut session = started_session();
    show_caption_at(&mut session, TWO_GAPS, 4.0);
    show_caption_at(&mut session, "Some other words", 6.0);
    show_caption_at(&mut session, TWO_GAPS, 8.0);

    let outcome = session.start_replay("segment-4000").unwrap();

    assert_eq!(session.host().seeks, vec![3.5]);
    assert!(outcome.is_started());
}

#[test]
fn test_startReplay_withUnknownSegment_shouldSkip() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);

    let outcome = session.start_replay("segment-42").unwrap();

    assert_eq!(outcome, ReplayOutcome::Skipped(SkipReason::UnknownSegment));
    assert!(session.host().seeks.is_empty());
    assert!(!session.is_replaying());
}

#[test]
fn test_startReplay_withoutVideo_shouldSkip() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);
    session.host_mut().video_present = false;

    let outcome = session.start_replay("segment-2000").unwrap();

    assert_eq!(outcome, ReplayOutcome::Skipped(SkipReason::NoVideo));
    assert!(!session.is_replaying());
}

#[test]
fn test_startReplay_withOpenSegment_shouldPlayUntilNow() {
    let mut session = started_session();
    show_caption_at(&mut session, TWO_GAPS, 2.0);
    session.host_mut().time = 4.0;

    let outcome = session.start_replay("segment-2000").unwrap();

    assert_eq!(
        outcome,
        ReplayOutcome::Started {
            segment_id: "segment-2000".to_string(),
            seek_to: 1.5,
            until: 4.0,
        }
    );
    assert_eq!(session.exercise_segment().unwrap().id, "segment-2000");
}

#[test]
fn test_startReplay_withEmptyRange_shouldSkip() {
    let mut session = started_session();
    show_caption_at(&mut session, TWO_GAPS, 2.0);

    // still at 2.0, the open segment ends where it starts
    let outcome = session.start_replay("segment-2000").unwrap();

    assert_eq!(outcome, ReplayOutcome::Skipped(SkipReason::EmptyRange));
    assert!(session.host().seeks.is_empty());
    assert!(session
        .host()
        .subscriptions_for(EventSource::VideoTimeUpdate)
        .is_empty());
}

#[test]
fn test_startReplay_withCorruptedStart_shouldReturnSeekError() {
    let mut session = started_session();
    session.host_mut().time = f64::NAN;
    session.host_mut().show_caption(TWO_GAPS);
    fire(&mut session, EventSource::CaptionMutations);
    session.host_mut().time = 5.0;
    session.host_mut().show_caption("Following line");
    fire(&mut session, EventSource::CaptionMutations);
    let segment_id = session.exercise_segment().unwrap().id.clone();

    let result = session.start_replay(&segment_id);

    match result {
        Err(ReplayError::Seek { segment_id: id, source: HostError::InvalidTime(t) }) => {
            assert_eq!(id, segment_id);
            assert!(t.is_nan());
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert!(!session.is_replaying());
    assert!(session
        .host()
        .subscriptions_for(EventSource::VideoTimeUpdate)
        .is_empty());
}

#[test]
fn test_startReplay_twice_shouldKeepSingleListener() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);

    session.start_replay("segment-2000").unwrap();
    session.start_replay("segment-2000").unwrap();

    assert_eq!(
        session.host().subscriptions_for(EventSource::VideoTimeUpdate).len(),
        1
    );
    assert_eq!(session.host().seeks, vec![1.5, 1.5]);
}

#[test]
fn test_startReplay_withoutTimeUpdates_shouldLeaveExerciseUntouched() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);
    session.host_mut().refused_sources.push(EventSource::VideoTimeUpdate);
    session.host_mut().time = 6.0;
    let seeks = session.host().seeks.len();

    let outcome = session.start_replay("segment-5000").unwrap();

    assert_eq!(outcome, ReplayOutcome::Skipped(SkipReason::NoVideo));
    assert_eq!(session.exercise_segment().unwrap().id, "segment-2000");
    assert!(!session.is_replaying());
    assert_eq!(session.host().seeks.len(), seeks);
    assert!(session.drain_notifications().is_empty());
}

#[test]
fn test_startReplay_withRejectedPlay_shouldStillTrackSegment() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);
    session.host_mut().reject_play = true;

    let outcome = session.start_replay("segment-2000").unwrap();

    assert!(outcome.is_started());
    assert!(session.is_replaying());
}

#[test]
fn test_captions_duringReplay_shouldBeIgnored() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);
    let active = session.active_segment().cloned();
    session.start_replay("segment-2000").unwrap();

    show_caption_at(&mut session, "Caption rendered while replaying", 3.0);

    assert_eq!(session.active_segment().cloned(), active);
    assert_eq!(session.earliest_start("caption rendered while replaying"), None);
}

#[test]
fn test_seek_toReplayTarget_shouldKeepReplaying() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);
    session.start_replay("segment-2000").unwrap();
    session.drain_notifications();

    seek_to(&mut session, 1.5);

    assert!(session.exercise_segment().is_some());
    assert!(session.is_replaying());
    assert!(session.drain_notifications().is_empty());
}

#[test]
fn test_seek_withinToleranceDuringReplay_shouldKeepReplaying() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);
    session.start_replay("segment-2000").unwrap();

    seek_to(&mut session, 3.0);

    assert!(session.exercise_segment().is_some());
    assert!(session.is_replaying());
}

#[test]
fn test_seek_farAwayDuringReplay_shouldClearExerciseAndStopReplay() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);
    session.validate_gap("segment-2000", 0, "wrong", "world").unwrap();
    assert!(session.is_replaying());
    let pauses = session.host().pause_calls;
    session.drain_notifications();

    seek_to(&mut session, 40.0);
    time_update(&mut session, 40.1);

    assert!(session.exercise_segment().is_none());
    assert!(!session.is_replaying());
    assert_eq!(session.host().pause_calls, pauses);
    assert!(session.host().subscriptions_for(EventSource::VideoTimeUpdate).is_empty());
    assert_eq!(session.gap_status("segment-2000", 0), GapStatus::Default);
    assert_eq!(
        session.drain_notifications(),
        vec![
            SessionNotification::ReplayFinished {
                segment_id: "segment-2000".to_string()
            },
            SessionNotification::ExerciseCleared,
        ]
    );
}

#[test]
fn test_replayEnd_shouldNotifyFinishedAndPaused() {
    let mut session = session_with_exercise(TWO_GAPS, 2.0, 5.0);
    session.start_replay("segment-2000").unwrap();
    session.drain_notifications();

    time_update(&mut session, 5.2);

    assert_eq!(
        session.drain_notifications(),
        vec![
            SessionNotification::ReplayFinished {
                segment_id: "segment-2000".to_string()
            },
            SessionNotification::PlaybackPaused,
        ]
    );
}

#[test]
fn test_startReplay_withCapturedSegment_shouldUsePreviousSegment() {
    let mut session = ExerciseSession::with_defaults(MockHost::new());
    session.start();
    show_caption_at(&mut session, NO_GAPS, 1.0);
    show_caption_at(&mut session, "Something", 2.0);
    assert!(session.exercise_segment().is_none());

    let outcome = session.start_replay("segment-1000").unwrap();

    assert!(outcome.is_started());
    assert_eq!(session.exercise_segment().unwrap().id, "segment-1000");
    assert_eq!(session.host().seeks, vec![0.5]);
}
