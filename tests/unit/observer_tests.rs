/*!
 * Tests for caption observation and segment reconstruction
 */

use lingo_gapfy::capture::{CaptionObserver, CaptureUpdate};
use lingo_gapfy::host::{EventSource, HostError, Surface};
use lingo_gapfy::segment::EarliestStartMemory;

use crate::common::mock_host::MockHost;

fn attached() -> (CaptionObserver, MockHost, EarliestStartMemory) {
    let mut host = MockHost::new();
    let mut observer = CaptionObserver::new();
    observer.start(&mut host).unwrap();
    (observer, host, EarliestStartMemory::new())
}

#[test]
fn test_start_withoutContainer_shouldFailUnavailable() {
    let mut host = MockHost::new();
    host.container_present = false;
    let mut observer = CaptionObserver::new();

    let result = observer.start(&mut host);

    assert_eq!(result, Err(HostError::Unavailable(Surface::CaptionContainer)));
    assert!(!observer.is_capturing());
}

#[test]
fn test_start_twice_shouldKeepSingleSubscription() {
    let (mut observer, mut host, _) = attached();

    observer.start(&mut host).unwrap();

    assert_eq!(host.subscriptions_for(EventSource::CaptionMutations).len(), 1);
    assert_eq!(host.unsubscribed.len(), 1);
}

#[test]
fn test_onMutation_firstCaption_shouldStartActiveSegment() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 1.0;
    host.show_caption("Hello there");

    let update = observer.on_mutation(&host, &mut memory, false);

    match update {
        CaptureUpdate::Started(segment) => {
            assert_eq!(segment.id, "segment-1000");
            assert_eq!(segment.text, "Hello there");
            assert_eq!(segment.end_time, None);
        }
        other => panic!("unexpected update {:?}", other),
    }
    assert!(observer.previous().is_none());
}

#[test]
fn test_onMutation_streamedWords_shouldExtendSameSegment() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 1.0;
    host.show_caption("Hello");
    observer.on_mutation(&host, &mut memory, false);

    host.time = 1.4;
    host.stream_caption("Hello there friend");
    let update = observer.on_mutation(&host, &mut memory, false);

    let active = observer.active().unwrap();
    assert!(matches!(update, CaptureUpdate::Extended(_)));
    assert_eq!(active.id, "segment-1000");
    assert_eq!(active.start_time, 1.0);
    assert_eq!(active.text, "Hello there friend");
    assert_eq!(memory.lookup("hello"), Some(1.0));
    assert_eq!(memory.lookup("hello there friend"), None);
}

#[test]
fn test_onMutation_streamedLineSharingOpeningWord_shouldKeepOwnStart() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 2.0;
    host.show_caption("I");
    observer.on_mutation(&host, &mut memory, false);
    host.stream_caption("I think so");
    observer.on_mutation(&host, &mut memory, false);
    host.time = 4.0;
    host.show_caption("Something else");
    observer.on_mutation(&host, &mut memory, false);

    host.time = 10.0;
    host.show_caption("I");
    observer.on_mutation(&host, &mut memory, false);
    host.stream_caption("I know you");
    let update = observer.on_mutation(&host, &mut memory, false);
    assert_eq!(observer.active().unwrap().id, "segment-10000");
    assert!(matches!(update, CaptureUpdate::Extended(_)));

    host.time = 12.0;
    host.show_caption("Next");
    let update = observer.on_mutation(&host, &mut memory, false);

    let CaptureUpdate::Sealed { previous, .. } = update else {
        panic!("expected a sealed segment");
    };
    assert_eq!(previous.id, "segment-10000");
    assert_eq!(previous.text, "I know you");
    assert_eq!(previous.start_time, 10.0);
    assert_eq!(previous.end_time, Some(12.0));
    assert_eq!(memory.lookup("i think so"), Some(2.0));
    assert_eq!(memory.lookup("i know you"), Some(10.0));
}

#[test]
fn test_onMutation_streamedLineSeenAgain_shouldResolveToFirstSighting() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 3.0;
    host.show_caption("We");
    observer.on_mutation(&host, &mut memory, false);
    host.stream_caption("We meet again");
    observer.on_mutation(&host, &mut memory, false);
    host.time = 5.0;
    host.show_caption("Other words");
    observer.on_mutation(&host, &mut memory, false);

    // seeked back and streamed once more
    host.time = 3.4;
    host.show_caption("We");
    observer.on_mutation(&host, &mut memory, false);
    host.stream_caption("We meet again");
    let update = observer.on_mutation(&host, &mut memory, false);

    let CaptureUpdate::Extended(active) = update else {
        panic!("expected an extended segment");
    };
    assert_eq!(active.id, "segment-3000");
    assert_eq!(active.start_time, 3.0);
}

#[test]
fn test_onMutation_newNodeWithNewText_shouldSealPrevious() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 1.0;
    host.show_caption("First line");
    observer.on_mutation(&host, &mut memory, false);

    host.time = 3.25;
    host.show_caption("Second line");
    let update = observer.on_mutation(&host, &mut memory, false);

    let CaptureUpdate::Sealed { previous, active } = update else {
        panic!("expected a sealed segment");
    };
    assert_eq!(previous.id, "segment-1000");
    assert_eq!(previous.text, "First line");
    assert_eq!(previous.end_time, Some(3.25));
    assert_eq!(active.id, "segment-3250");
    assert_eq!(observer.previous(), Some(&previous));
    assert_eq!(observer.active(), Some(&active));
}

#[test]
fn test_onMutation_clockMovedBack_shouldNotEndBeforeStart() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 5.0;
    host.show_caption("Late line");
    observer.on_mutation(&host, &mut memory, false);

    host.time = 2.0;
    host.show_caption("Earlier line");
    let update = observer.on_mutation(&host, &mut memory, false);

    let CaptureUpdate::Sealed { previous, .. } = update else {
        panic!("expected a sealed segment");
    };
    assert_eq!(previous.end_time, Some(5.0));
}

#[test]
fn test_onMutation_recreatedNodeSameText_shouldOnlyTrackNode() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 1.0;
    host.show_caption("Same text");
    observer.on_mutation(&host, &mut memory, false);

    host.time = 1.5;
    host.recreate_caption();
    let update = observer.on_mutation(&host, &mut memory, false);

    assert_eq!(update, CaptureUpdate::NodeRecreated);
    assert_eq!(observer.active().unwrap().id, "segment-1000");
    assert!(observer.previous().is_none());

    // the new node is now the tracked one
    host.stream_caption("Same text continues");
    let update = observer.on_mutation(&host, &mut memory, false);
    assert!(matches!(update, CaptureUpdate::Extended(_)));
}

#[test]
fn test_onMutation_withSurroundingWhitespace_shouldCompareTrimmedText() {
    let (mut observer, mut host, mut memory) = attached();
    host.show_caption("Padded");
    observer.on_mutation(&host, &mut memory, false);

    host.stream_caption("  Padded  ");
    let update = observer.on_mutation(&host, &mut memory, false);

    assert_eq!(update, CaptureUpdate::Unchanged);
}

#[test]
fn test_onMutation_withEmptyOrMissingCaption_shouldIgnore() {
    let (mut observer, mut host, mut memory) = attached();

    assert_eq!(observer.on_mutation(&host, &mut memory, false), CaptureUpdate::Ignored);

    host.show_caption("   ");
    assert_eq!(observer.on_mutation(&host, &mut memory, false), CaptureUpdate::Ignored);
    assert!(observer.active().is_none());
}

#[test]
fn test_onMutation_duringReplay_shouldIgnoreEverything() {
    let (mut observer, mut host, mut memory) = attached();
    host.show_caption("Replayed words");

    let update = observer.on_mutation(&host, &mut memory, true);

    assert_eq!(update, CaptureUpdate::Ignored);
    assert!(observer.active().is_none());
    assert!(memory.is_empty());
}

#[test]
fn test_onMutation_repeatedText_shouldResolveToEarliestStart() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 5.0;
    host.show_caption("Repeat line");
    observer.on_mutation(&host, &mut memory, false);
    host.time = 6.0;
    host.show_caption("Something else");
    observer.on_mutation(&host, &mut memory, false);

    host.time = 7.0;
    host.show_caption("Repeat   LINE");
    let update = observer.on_mutation(&host, &mut memory, false);

    let CaptureUpdate::Sealed { active, .. } = update else {
        panic!("expected a sealed segment");
    };
    assert_eq!(active.id, "segment-5000");
    assert_eq!(active.start_time, 5.0);
}

#[test]
fn test_onMutation_afterClearSegments_shouldStartFreshOnStreaming() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 1.0;
    host.show_caption("Hello");
    observer.on_mutation(&host, &mut memory, false);
    observer.clear_segments();

    host.time = 8.0;
    host.stream_caption("Hello again");
    let update = observer.on_mutation(&host, &mut memory, false);

    assert!(matches!(update, CaptureUpdate::Extended(_)));
    assert_eq!(observer.active().unwrap().id, "segment-8000");
}

#[test]
fn test_stop_shouldKeepMemoryButForgetNode() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 2.0;
    host.show_caption("Remember me");
    observer.on_mutation(&host, &mut memory, false);

    observer.stop(&mut host);

    assert!(!observer.is_capturing());
    assert!(host.subscriptions_for(EventSource::CaptionMutations).is_empty());
    assert_eq!(memory.lookup("remember me"), Some(2.0));

    // after a restart the same node counts as new
    observer.start(&mut host).unwrap();
    host.time = 3.0;
    host.stream_caption("Remember me later");
    let update = observer.on_mutation(&host, &mut memory, false);
    assert!(matches!(update, CaptureUpdate::Sealed { .. }));
}

#[test]
fn test_find_shouldLookAtActiveThenPrevious() {
    let (mut observer, mut host, mut memory) = attached();
    host.time = 1.0;
    host.show_caption("One");
    observer.on_mutation(&host, &mut memory, false);
    host.time = 2.0;
    host.show_caption("Two");
    observer.on_mutation(&host, &mut memory, false);

    assert_eq!(observer.find("segment-1000").unwrap().text, "One");
    assert_eq!(observer.find("segment-2000").unwrap().text, "Two");
    assert!(observer.find("segment-3000").is_none());
}
