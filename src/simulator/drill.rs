/*!
 * Terminal drill.
 *
 * Drives an `ExerciseSession` over a `SimulatedPage`: the caller advances
 * time with `step` and feeds typed lines to `answer`; everything the session
 * reports is rendered as text lines on a `DrillOutput`.
 */

use std::time::Duration;

use log::{debug, warn};

use crate::app_config::Config;
use crate::errors::AppError;
use crate::exercise::{GapInput, GapStatus, InputOutcome};
use crate::host::HostPage;
use crate::replay::ReplayOutcome;
use crate::session::{ExerciseSession, SessionNotification};
use crate::simulator::page::SimulatedPage;
use crate::tokenizer::WordToken;

/// Where the drill writes what the learner sees
pub trait DrillOutput {
    fn line(&mut self, text: &str);

    /// Playback position changed
    fn progress(&mut self, _position: f64, _duration: f64) {}
}

impl DrillOutput for Vec<String> {
    fn line(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// A typed line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Empty,
    /// Answer for the focused gap
    Answer(String),
    /// `:r` replay the exercise segment
    Replay,
    /// `:s` seek past the exercise segment
    Skip,
    /// `:c` flip the host's native captions
    Captions,
    /// `:q`
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            ":r" => Self::Replay,
            ":s" => Self::Skip,
            ":c" => Self::Captions,
            ":q" => Self::Quit,
            answer => Self::Answer(answer.to_string()),
        }
    }
}

/// Counters shown at the end of a drill
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrillStats {
    pub exercises: usize,
    pub correct: usize,
    pub mistakes: usize,
    pub replays: usize,
    pub skipped: usize,
}

pub struct Drill<O: DrillOutput> {
    session: ExerciseSession<SimulatedPage>,
    output: O,
    skip_margin: f64,
    inputs: Vec<GapInput>,
    focus: usize,
    stats: DrillStats,
    quit: bool,
}

impl<O: DrillOutput> Drill<O> {
    pub fn new(page: SimulatedPage, config: &Config, output: O) -> Self {
        Self {
            session: ExerciseSession::new(page, config),
            output,
            skip_margin: config.exercise.seek_tolerance_secs + 0.5,
            inputs: Vec::new(),
            focus: 0,
            stats: DrillStats::default(),
            quit: false,
        }
    }

    pub fn session(&self) -> &ExerciseSession<SimulatedPage> {
        &self.session
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn stats(&self) -> DrillStats {
        self.stats
    }

    /// Gap inputs of the exercise on screen
    pub fn inputs(&self) -> &[GapInput] {
        &self.inputs
    }

    pub fn focused(&self) -> Option<&GapInput> {
        self.inputs.get(self.focus)
    }

    /// Start the exercise and the video
    pub fn start(&mut self) {
        self.session.start();
        if let Err(e) = self.session.host_mut().play() {
            warn!("Video play failed: {}", e);
            self.output.line(&format!("Playback refused: {}", e));
        }
        self.pump();
    }

    /// Let `wall` of real time pass
    pub fn step(&mut self, wall: Duration) {
        self.session.host_mut().advance(wall);
        self.pump();
        let page = self.session.host();
        let (position, duration) = (page.position(), page.duration());
        self.output.progress(position, duration);
    }

    /// Handle one typed line
    pub fn answer(&mut self, line: &str) -> Result<(), AppError> {
        match Command::parse(line) {
            Command::Empty => {}
            Command::Quit => self.quit = true,
            Command::Replay => self.replay()?,
            Command::Skip => self.skip()?,
            Command::Captions => {
                let page = self.session.host_mut();
                let enabled = page.native_captions_enabled()?;
                page.set_native_captions_enabled(!enabled);
            }
            Command::Answer(text) => self.submit(&text)?,
        }
        self.pump();
        Ok(())
    }

    /// Quit was requested, or the video ended with no exercise left open
    pub fn is_finished(&self) -> bool {
        self.quit || (self.session.host().is_ended() && self.inputs.is_empty())
    }

    /// Stop the session and hand back the counters and the output
    pub fn finish(mut self) -> (DrillStats, O) {
        self.session.stop();
        (self.stats, self.output)
    }

    fn submit(&mut self, text: &str) -> Result<(), AppError> {
        let Some(input) = self.inputs.get_mut(self.focus) else {
            self.output.line("No gap to fill right now");
            return Ok(());
        };

        match input.answer(&mut self.session, text)? {
            InputOutcome::Incorrect => {
                let hint = input.hint().unwrap_or_default();
                self.output.line(&format!("✗ '{}' is not it, hint: {}", text, hint));
            }
            InputOutcome::Correct => self.output.line(&format!("✓ {}", input.word())),
            InputOutcome::Pending => {}
        }
        Ok(())
    }

    fn replay(&mut self) -> Result<(), AppError> {
        let Some(segment_id) = self.session.exercise_segment().map(|s| s.id.clone()) else {
            self.output.line("Nothing to replay");
            return Ok(());
        };
        if let ReplayOutcome::Skipped(reason) = self.session.start_replay(&segment_id)? {
            self.output.line(&format!("Cannot replay: {}", reason));
        }
        Ok(())
    }

    fn skip(&mut self) -> Result<(), AppError> {
        let Some(segment) = self.session.exercise_segment() else {
            self.output.line("Nothing to skip");
            return Ok(());
        };
        let target = segment.end_time.unwrap_or(segment.start_time) + self.skip_margin;
        debug!("Skipping {} by seeking to {:.3}s", segment.id, target);

        self.session.host_mut().set_current_time(target)?;
        self.pump();
        if let Err(e) = self.session.host_mut().play() {
            warn!("Video play failed: {}", e);
        }
        self.stats.skipped += 1;
        Ok(())
    }

    fn pump(&mut self) {
        loop {
            let events = self.session.host_mut().take_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.session.dispatch(event);
            }
        }

        for notification in self.session.drain_notifications() {
            self.on_notification(notification);
        }
    }

    fn on_notification(&mut self, notification: SessionNotification) {
        match notification {
            SessionNotification::ExercisePublished { segment_id } => {
                let same = self
                    .inputs
                    .first()
                    .is_some_and(|input| input.segment_id() == segment_id);
                if !same {
                    self.load_exercise();
                }
            }
            SessionNotification::ExerciseCleared => {
                if !self.inputs.is_empty() {
                    self.output.line("» exercise dropped");
                }
                self.inputs.clear();
            }
            SessionNotification::GapStatusChanged { status, .. } => match status {
                GapStatus::Correct => self.stats.correct += 1,
                GapStatus::Error => self.stats.mistakes += 1,
                GapStatus::Default => {}
            },
            SessionNotification::FocusGap { index, .. } => self.focus_from(index),
            SessionNotification::PlaybackPaused => {
                if !self.inputs.is_empty() {
                    self.render_exercise();
                }
            }
            SessionNotification::PlaybackResumed => {
                self.output.line("▶ well done, moving on");
                self.inputs.clear();
            }
            SessionNotification::ReplayStarted { .. } => {
                self.stats.replays += 1;
                self.output.line("↺ listen again...");
            }
            SessionNotification::ReplayFinished { .. } => {}
        }
    }

    fn load_exercise(&mut self) {
        let Some(view) = self.session.exercise_view() else {
            return;
        };
        self.inputs = view
            .tokens
            .iter()
            .filter_map(|token| GapInput::for_token(&view.segment.id, token))
            .collect();
        self.stats.exercises += 1;
        self.focus_from(0);
    }

    fn focus_from(&mut self, index: usize) {
        let open = |input: &GapInput| {
            self.session.gap_status(input.segment_id(), input.index()) != GapStatus::Correct
        };
        self.focus = self
            .inputs
            .iter()
            .position(|input| input.index() >= index && open(input))
            .or_else(|| self.inputs.iter().position(|input| open(input)))
            .unwrap_or(0);
    }

    fn render_exercise(&mut self) {
        let Some(view) = self.session.exercise_view() else {
            return;
        };
        let focused = self.focused().map(GapInput::index);

        let mut line = String::new();
        for token in &view.tokens {
            match token {
                WordToken::Text { value, .. } => line.push_str(value),
                WordToken::Gap { value, index, .. } => {
                    if view.status(*index) == GapStatus::Correct {
                        line.push_str(value);
                        continue;
                    }
                    let fill = self
                        .inputs
                        .iter()
                        .find(|input| input.index() == *index)
                        .and_then(GapInput::hint)
                        .unwrap_or_else(|| "_".repeat(value.chars().count()));
                    let marker = if focused == Some(*index) { ">" } else { "" };
                    line.push_str(&format!("{}[{}:{}]", marker, index + 1, fill));
                }
            }
        }
        self.output.line(&line);
    }
}
