/*!
 * Exercise session state machine.
 *
 * This module handles:
 * - Starting and stopping an exercise over the host page
 * - Turning sealed caption segments into paused exercises
 * - Gap validation, replay on mistakes and resume on completion
 * - Routing host notifications and timers to their owners
 */

use std::time::Duration;

use log::{debug, info, trace, warn};

use crate::app_config::Config;
use crate::capture::{CaptionObserver, CaptureTimer, CaptureTimers, CaptureUpdate, RetryPolicy, ToggleWatcher};
use crate::errors::ReplayError;
use crate::exercise::{ExerciseStore, ExerciseView, GapStatus};
use crate::host::{HostEvent, HostPage, SubscriptionId, TimerId};
use crate::replay::{ReplayController, ReplayOutcome};
use crate::seek_guard::SeekGuard;
use crate::segment::{EarliestStartMemory, Segment};
use crate::tokenizer::{self, WordToken};

use super::models::SessionNotification;

/// One fill-in-the-gap exercise running over a host page
pub struct ExerciseSession<H: HostPage> {
    host: H,
    active: bool,
    observer: CaptionObserver,
    memory: EarliestStartMemory,
    store: ExerciseStore,
    replay: ReplayController,
    guard: SeekGuard,
    toggle: ToggleWatcher,
    timers: CaptureTimers,
    retry: RetryPolicy,
    toggle_restart_delay: Duration,
    /// Last observed value of `all_gaps_completed`
    completed: bool,
    notifications: Vec<SessionNotification>,
}

impl<H: HostPage> ExerciseSession<H> {
    /// Create an inactive session over a host page
    pub fn new(host: H, config: &Config) -> Self {
        Self {
            host,
            active: false,
            observer: CaptionObserver::new(),
            memory: EarliestStartMemory::new(),
            store: ExerciseStore::new(config.exercise.gap_rule),
            replay: ReplayController::new(config.exercise.replay_lead_in_secs),
            guard: SeekGuard::new(config.exercise.seek_tolerance_secs),
            toggle: ToggleWatcher::new(),
            timers: CaptureTimers::new(),
            retry: config.capture.retry_policy(),
            toggle_restart_delay: config.capture.toggle_restart_delay(),
            completed: false,
            notifications: Vec::new(),
        }
    }

    /// Create an inactive session with the default configuration
    pub fn with_defaults(host: H) -> Self {
        Self::new(host, &Config::default())
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Take over the page: hide the host chrome, capture captions and watch
    /// for seeks. Does nothing when already active.
    pub fn start(&mut self) {
        if self.active {
            debug!("Exercise already active");
            return;
        }
        info!("Starting exercise");

        self.host.set_overlay_visible(false);
        if let Err(e) = self.host.enable_native_captions() {
            warn!("Could not enable native captions: {}", e);
        }
        self.host.set_native_captions_visible(false);

        self.try_start_capture(1);
        self.toggle.install(&mut self.host);
        self.store.clear_segment();
        self.guard.install(&mut self.host);

        self.active = true;
    }

    /// Give the page back. Safe to call repeatedly or without `start`.
    pub fn stop(&mut self) {
        let was_active = self.active;
        self.active = false;

        self.store.clear_segment();
        self.host.set_overlay_visible(true);
        self.observer.stop(&mut self.host);
        self.observer.clear_segments();
        self.toggle.uninstall(&mut self.host);
        self.guard.uninstall(&mut self.host);
        self.replay.cancel(&mut self.host);
        self.timers.cancel_all(&mut self.host);
        self.store.clear_gaps();
        self.completed = false;
        self.host.set_native_captions_visible(true);
        self.host.restore_caption_toggle();

        if was_active {
            info!("Exercise stopped");
            self.notify(SessionNotification::ExerciseCleared);
        }
    }

    /// Route a host notification to the component that owns it. Stale and
    /// unknown ids are ignored.
    pub fn dispatch(&mut self, event: HostEvent) {
        match event {
            HostEvent::Notify(id) => self.on_notify(id),
            HostEvent::Timer(id) => self.on_timer(id),
        }
    }

    fn on_notify(&mut self, id: SubscriptionId) {
        if self.observer.owns(id) {
            self.on_captions_mutated();
        } else if self.toggle.owns(id) {
            self.on_toggle_changed();
        } else if self.replay.owns(id) {
            self.on_replay_time_update();
        } else if self.guard.owns(id) {
            self.on_seeking();
        } else {
            trace!("Ignoring notification for stale {:?}", id);
        }
    }

    fn on_timer(&mut self, id: TimerId) {
        match self.timers.take(id) {
            Some(CaptureTimer::Retry { attempt }) => self.try_start_capture(attempt),
            Some(CaptureTimer::ToggleRestart) => {
                debug!("Restarting caption capture after toggle");
                self.host.set_native_captions_visible(false);
                self.try_start_capture(1);
            }
            None => trace!("Ignoring unknown {:?}", id),
        }
    }

    // =========================================================================
    // Caption capture
    // =========================================================================

    pub fn is_capturing(&self) -> bool {
        self.observer.is_capturing()
    }

    fn try_start_capture(&mut self, attempt: u32) {
        match self.observer.start(&mut self.host) {
            Ok(()) => debug!("Caption capture started on attempt {}", attempt),
            Err(e) if self.retry.allows_after(attempt) => {
                debug!("Caption capture attempt {} failed: {}", attempt, e);
                self.timers.schedule(
                    &mut self.host,
                    self.retry.delay,
                    CaptureTimer::Retry { attempt: attempt + 1 },
                );
            }
            Err(e) => warn!(
                "Giving up on caption capture after {} attempts: {}",
                attempt, e
            ),
        }
    }

    fn on_toggle_changed(&mut self) {
        match self.host.native_captions_enabled() {
            Ok(true) => {
                debug!("Native captions switched on, re-attaching capture");
                self.observer.stop(&mut self.host);
                self.timers.schedule(
                    &mut self.host,
                    self.toggle_restart_delay,
                    CaptureTimer::ToggleRestart,
                );
            }
            Ok(false) => trace!("Native captions switched off"),
            Err(e) => debug!("Caption toggle unreadable: {}", e),
        }
    }

    fn on_captions_mutated(&mut self) {
        let update = self
            .observer
            .on_mutation(&self.host, &mut self.memory, self.replay.is_active());
        if let CaptureUpdate::Sealed { previous, .. } = update {
            self.on_segment_sealed(previous);
        }
    }

    fn on_segment_sealed(&mut self, segment: Segment) {
        if self.store.last_paused() == Some(segment.id.as_str()) {
            trace!("Segment {} already paused for", segment.id);
            return;
        }

        let replaying = self.replay.is_active();
        if replaying && self.store.segment_id() != Some(segment.id.as_str()) {
            return;
        }

        let tokens = self.store.tokenize(&segment);
        let gaps: Vec<usize> = tokenizer::gap_words(&tokens)
            .into_iter()
            .map(|(index, _)| index)
            .collect();
        if gaps.is_empty() {
            debug!("Segment {} has no gaps", segment.id);
            return;
        }
        if !replaying && self.store.gaps().all_correct(&segment.id, gaps) {
            debug!("Segment {} already solved", segment.id);
            return;
        }

        let segment_id = segment.id.clone();
        self.store.publish(segment, tokens);
        self.notify(SessionNotification::ExercisePublished {
            segment_id: segment_id.clone(),
        });

        if !replaying {
            match self.host.pause() {
                Ok(()) => self.notify(SessionNotification::PlaybackPaused),
                Err(e) => warn!("Video pause failed: {}", e),
            }
            self.store.mark_paused(&segment_id);
        }
        self.sync_completion();
    }

    // =========================================================================
    // Gaps
    // =========================================================================

    /// Check an answer for a gap. A mismatch replays the segment, and a
    /// replay refused by the video is returned as an error.
    pub fn validate_gap(
        &mut self,
        segment_id: &str,
        index: usize,
        input: &str,
        correct_word: &str,
    ) -> Result<bool, ReplayError> {
        let matched = input.trim().to_lowercase() == correct_word.trim().to_lowercase();
        let before = self.store.gaps().status(segment_id, index);
        let status = self.store.record_gap(segment_id, index, matched);
        if status != before {
            self.notify(SessionNotification::GapStatusChanged {
                segment_id: segment_id.to_string(),
                index,
                status,
            });
        }

        if matched {
            debug!("Gap {} of {} answered correctly", index, segment_id);
            if self.store.has_gap(segment_id, index + 1) {
                self.notify(SessionNotification::FocusGap {
                    segment_id: segment_id.to_string(),
                    index: index + 1,
                });
            }
            self.sync_completion();
        } else if before != GapStatus::Correct {
            // a solved gap stays solved, so a later mismatch on it replays nothing
            debug!("Gap {} of {} answered wrong", index, segment_id);
            self.start_replay(segment_id)?;
        }

        Ok(matched)
    }

    /// Clear a mistake once the learner edits the answer
    pub fn reset_gap_status(&mut self, segment_id: &str, index: usize) {
        let before = self.store.gaps().status(segment_id, index);
        let status = self.store.reset_gap(segment_id, index);
        if status != before {
            self.notify(SessionNotification::GapStatusChanged {
                segment_id: segment_id.to_string(),
                index,
                status,
            });
        }
    }

    pub fn gap_status(&self, segment_id: &str, index: usize) -> GapStatus {
        self.store.gaps().status(segment_id, index)
    }

    /// The exercise segment has gaps and every one of them is correct
    pub fn all_gaps_completed(&self) -> bool {
        self.store.all_gaps_completed()
    }

    fn sync_completion(&mut self) {
        let completed = self.store.all_gaps_completed();
        if completed && !self.completed {
            if let Some(segment_id) = self.replay.segment_id().map(String::from) {
                self.replay.cancel(&mut self.host);
                self.notify(SessionNotification::ReplayFinished { segment_id });
            }
            info!("All gaps completed, resuming playback");
            match self.host.play() {
                Ok(()) => self.notify(SessionNotification::PlaybackResumed),
                Err(e) => warn!("Video play failed: {}", e),
            }
        }
        self.completed = completed;
    }

    // =========================================================================
    // Replay
    // =========================================================================

    pub fn is_replaying(&self) -> bool {
        self.replay.is_active()
    }

    /// Seek back to a segment and play it again
    pub fn start_replay(&mut self, segment_id: &str) -> Result<ReplayOutcome, ReplayError> {
        let outcome = self.replay.start(
            &mut self.host,
            segment_id,
            &mut self.store,
            &self.observer,
            &self.memory,
        )?;

        if let ReplayOutcome::Started { segment_id, .. } = &outcome {
            self.notify(SessionNotification::ExercisePublished {
                segment_id: segment_id.clone(),
            });
            self.notify(SessionNotification::ReplayStarted {
                segment_id: segment_id.clone(),
            });
        }
        self.sync_completion();
        Ok(outcome)
    }

    fn on_replay_time_update(&mut self) {
        let segment_id = self.replay.segment_id().map(String::from);
        if self.replay.on_time_update(&mut self.host) {
            if let Some(segment_id) = segment_id {
                self.notify(SessionNotification::ReplayFinished { segment_id });
            }
            self.notify(SessionNotification::PlaybackPaused);
        }
    }

    // =========================================================================
    // Seeking
    // =========================================================================

    fn on_seeking(&mut self) {
        let Some(segment) = self.store.segment() else {
            return;
        };
        let position = match self.host.current_time() {
            Ok(position) => position,
            Err(e) => {
                debug!("Seek without playback position: {}", e);
                return;
            }
        };
        if self.replay.is_own_seek(position) {
            trace!("Replay seek to {:.3}s ignored", position);
            return;
        }

        if self.guard.is_outside(segment, position) {
            info!(
                "Seek to {:.3}s left exercise {}, clearing it",
                position, segment.id
            );
            self.clear_practice();
        }
    }

    fn clear_practice(&mut self) {
        if let Some(segment_id) = self.replay.segment_id().map(String::from) {
            self.notify(SessionNotification::ReplayFinished { segment_id });
        }
        self.store.clear_segment();
        self.observer.clear_segments();
        self.replay.cancel(&mut self.host);
        self.store.clear_gaps();
        self.completed = false;
        self.notify(SessionNotification::ExerciseCleared);
    }

    // =========================================================================
    // Read access
    // =========================================================================

    /// Snapshot of the exercise segment, its tokens and gap statuses
    pub fn exercise_view(&self) -> Option<ExerciseView> {
        self.store.view()
    }

    pub fn exercise_segment(&self) -> Option<&Segment> {
        self.store.segment()
    }

    pub fn tokens(&self) -> &[WordToken] {
        self.store.tokens()
    }

    /// Segment currently growing on screen
    pub fn active_segment(&self) -> Option<&Segment> {
        self.observer.active()
    }

    /// Last sealed segment
    pub fn previous_segment(&self) -> Option<&Segment> {
        self.observer.previous()
    }

    /// Earliest start time remembered for a caption text
    pub fn earliest_start(&self, text: &str) -> Option<f64> {
        self.memory.lookup(text)
    }

    /// Forget every remembered caption start time
    pub fn clear_memory(&mut self) {
        self.memory.clear();
    }

    /// Capture timers still waiting to fire
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Take the notifications raised since the last call
    pub fn drain_notifications(&mut self) -> Vec<SessionNotification> {
        std::mem::take(&mut self.notifications)
    }

    fn notify(&mut self, notification: SessionNotification) {
        trace!("Notification: {:?}", notification);
        self.notifications.push(notification);
    }
}
