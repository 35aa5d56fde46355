/*!
 * Simulated host page.
 *
 * Plays a transcript on a virtual clock and renders its cues the way
 * streaming sites do: words are streamed into a live caption node, every
 * cue gets its own node, and now and then a node is thrown away and
 * re-rendered with identical text. Notifications are queued and handed to
 * the caller through `take_events`.
 */

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Duration;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::app_config::DrillConfig;
use crate::host::{
    CaptionNode, EventSource, HostError, HostEvent, HostPage, NodeId, ReadyState, SubscriptionId,
    TimerId,
};
use crate::simulator::transcript::{Cue, Transcript};

// Share of a cue's duration over which its words appear
const STREAM_WINDOW: f64 = 0.6;

/// Behaviour knobs of the simulated page
#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    /// Reveal caption words progressively instead of all at once
    pub stream_words: bool,
    /// Chance per render of re-creating an unchanged caption node
    pub recreate_probability: f64,
    /// Playback rate
    pub speed: f64,
    /// Seed for the re-creation quirk, random when absent
    pub seed: Option<u64>,
    /// Refuse every play request, like a strict autoplay policy
    pub reject_play: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            stream_words: true,
            recreate_probability: 0.0,
            speed: 1.0,
            seed: None,
            reject_play: false,
        }
    }
}

impl PageOptions {
    pub fn from_config(config: &DrillConfig, seed: Option<u64>) -> Self {
        Self {
            stream_words: config.stream_words,
            recreate_probability: config.recreate_probability,
            speed: config.speed,
            seed,
            reject_play: false,
        }
    }
}

#[derive(Debug, Clone)]
struct RenderedCaption {
    node: NodeId,
    cue: usize,
    text: String,
}

pub struct SimulatedPage {
    transcript: Transcript,
    options: PageOptions,
    rng: StdRng,

    position: f64,
    elapsed: f64,
    playing: bool,

    overlay_visible: bool,
    native_captions_visible: bool,
    native_captions_enabled: bool,
    toggle_locked: bool,

    caption: Option<RenderedCaption>,
    cue_nodes: HashMap<usize, NodeId>,

    next_id: u64,
    subscriptions: BTreeMap<SubscriptionId, EventSource>,
    timers: BTreeMap<TimerId, f64>,
    pending: VecDeque<HostEvent>,
}

impl SimulatedPage {
    pub fn new(transcript: Transcript, options: PageOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            transcript,
            options,
            rng,
            position: 0.0,
            elapsed: 0.0,
            playing: false,
            overlay_visible: true,
            native_captions_visible: true,
            native_captions_enabled: false,
            toggle_locked: false,
            caption: None,
            cue_nodes: HashMap::new(),
            next_id: 1,
            subscriptions: BTreeMap::new(),
            timers: BTreeMap::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.transcript.duration_secs()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Playback reached the end of the transcript
    pub fn is_ended(&self) -> bool {
        self.position >= self.duration()
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn native_captions_visible(&self) -> bool {
        self.native_captions_visible
    }

    pub fn toggle_locked(&self) -> bool {
        self.toggle_locked
    }

    /// Text currently in the live caption node
    pub fn caption_text(&self) -> Option<&str> {
        self.caption.as_ref().map(|caption| caption.text.as_str())
    }

    /// Let `wall` of real time pass: fire due timers, move the clock when
    /// playing and re-render captions
    pub fn advance(&mut self, wall: Duration) {
        let dt = wall.as_secs_f64();
        self.elapsed += dt;
        self.fire_due_timers();

        if self.playing {
            let duration = self.duration();
            self.position = (self.position + dt * self.options.speed).min(duration);
            self.emit(EventSource::VideoTimeUpdate);
            if self.position >= duration {
                debug!("Playback reached the end at {:.3}s", self.position);
                self.playing = false;
            }
        }

        self.render();
    }

    /// Switch native captions on or off the way a keyboard shortcut would,
    /// bypassing the locked button
    pub fn set_native_captions_enabled(&mut self, enabled: bool) {
        if self.native_captions_enabled != enabled {
            self.native_captions_enabled = enabled;
            self.emit(EventSource::CaptionToggleAttribute);
        }
    }

    /// Notifications raised since the last call, in order
    pub fn take_events(&mut self) -> Vec<HostEvent> {
        self.pending.drain(..).collect()
    }

    pub fn has_pending_events(&self) -> bool {
        !self.pending.is_empty()
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn emit(&mut self, source: EventSource) {
        let targets: Vec<SubscriptionId> = self
            .subscriptions
            .iter()
            .filter(|(_, s)| **s == source)
            .map(|(id, _)| *id)
            .collect();
        for id in targets {
            self.pending.push_back(HostEvent::Notify(id));
        }
    }

    fn fire_due_timers(&mut self) {
        let mut due: Vec<(f64, TimerId)> = self
            .timers
            .iter()
            .filter(|(_, at)| **at <= self.elapsed)
            .map(|(id, at)| (*at, *id))
            .collect();
        due.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        for (_, id) in due {
            self.timers.remove(&id);
            self.pending.push_back(HostEvent::Timer(id));
        }
    }

    fn visible_text(&self, cue: &Cue) -> String {
        if !self.options.stream_words {
            return cue.text.clone();
        }
        let words: Vec<&str> = cue.text.split_whitespace().collect();
        let span = (cue.end_secs() - cue.start_secs()) * STREAM_WINDOW;
        let progress = if span > 0.0 {
            ((self.position - cue.start_secs()) / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let shown = ((words.len() as f64 * progress).ceil() as usize).clamp(1, words.len());
        words[..shown].join(" ")
    }

    fn node_for(&mut self, cue: usize) -> NodeId {
        if let Some(node) = self.cue_nodes.get(&cue) {
            return *node;
        }
        let node = NodeId(self.next_id());
        self.cue_nodes.insert(cue, node);
        node
    }

    fn render(&mut self) {
        let desired = self
            .transcript
            .cue_at(self.position)
            .map(|(index, cue)| (index, self.visible_text(cue)));

        let changed = match (desired, self.caption.take()) {
            (None, None) => false,
            (None, Some(_)) => true,
            (Some((cue, text)), Some(mut caption)) if caption.cue == cue => {
                let mut changed = false;
                if caption.text != text {
                    caption.text = text;
                    changed = true;
                } else if self.options.recreate_probability > 0.0
                    && self.rng.random_bool(self.options.recreate_probability)
                {
                    caption.node = NodeId(self.next_id());
                    self.cue_nodes.insert(cue, caption.node);
                    trace!("Re-created caption node for cue {}", cue);
                    changed = true;
                }
                self.caption = Some(caption);
                changed
            }
            (Some((cue, text)), _) => {
                let node = self.node_for(cue);
                self.caption = Some(RenderedCaption { node, cue, text });
                true
            }
        };

        if changed {
            self.emit(EventSource::CaptionMutations);
        }
    }
}

impl HostPage for SimulatedPage {
    fn current_time(&self) -> Result<f64, HostError> {
        Ok(self.position)
    }

    fn set_current_time(&mut self, seconds: f64) -> Result<(), HostError> {
        if !seconds.is_finite() {
            return Err(HostError::InvalidTime(seconds));
        }
        self.position = seconds.clamp(0.0, self.duration());
        trace!("Seeked to {:.3}s", self.position);
        self.emit(EventSource::VideoSeeking);
        self.render();
        Ok(())
    }

    fn play(&mut self) -> Result<(), HostError> {
        if self.options.reject_play {
            return Err(HostError::PlaybackRejected("autoplay blocked".to_string()));
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), HostError> {
        self.playing = false;
        Ok(())
    }

    fn ready_state(&self) -> Result<ReadyState, HostError> {
        Ok(ReadyState::HaveEnoughData)
    }

    fn last_caption(&self) -> Result<Option<CaptionNode>, HostError> {
        Ok(self.caption.as_ref().map(|caption| CaptionNode {
            node: caption.node,
            text: caption.text.clone(),
        }))
    }

    fn native_captions_enabled(&self) -> Result<bool, HostError> {
        Ok(self.native_captions_enabled)
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        self.overlay_visible = visible;
    }

    fn set_native_captions_visible(&mut self, visible: bool) {
        self.native_captions_visible = visible;
    }

    fn enable_native_captions(&mut self) -> Result<(), HostError> {
        self.native_captions_enabled = true;
        self.toggle_locked = true;
        Ok(())
    }

    fn restore_caption_toggle(&mut self) {
        self.toggle_locked = false;
    }

    fn subscribe(&mut self, source: EventSource) -> Result<SubscriptionId, HostError> {
        let id = SubscriptionId(self.next_id());
        self.subscriptions.insert(id, source);
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.remove(&id);
    }

    fn set_timeout(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id());
        self.timers.insert(id, self.elapsed + delay.as_secs_f64());
        id
    }

    fn clear_timeout(&mut self, id: TimerId) {
        self.timers.remove(&id);
    }
}
