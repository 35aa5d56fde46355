/*!
 * Timed caption segments and their identity.
 *
 * Host players tear down and re-create caption nodes freely, so the same
 * line can be observed several times at different playback positions. A
 * segment's identity is therefore derived from the earliest start time ever
 * seen for its normalized text.
 */

use std::collections::HashMap;

use log::trace;
use serde::Serialize;

/// A reconstructed, time-bounded unit of caption text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    /// Stable identifier, `segment-<start in ms>`
    pub id: String,

    /// Caption text as rendered by the host
    pub text: String,

    /// Start time in seconds (may be negative on some host clocks)
    pub start_time: f64,

    /// End time in seconds, assigned once the segment is superseded
    pub end_time: Option<f64>,
}

impl Segment {
    /// Create an open segment whose id is derived from its start time
    pub fn new(text: impl Into<String>, start_time: f64) -> Self {
        Self {
            id: segment_id(start_time),
            text: text.into(),
            start_time,
            end_time: None,
        }
    }

    /// Same segment with an end time
    pub fn sealed_at(mut self, end_time: f64) -> Self {
        self.end_time = Some(end_time);
        self
    }

    /// Same segment with replaced text, keeping id and start
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..self.clone()
        }
    }

    /// Normalized text used as identity key
    pub fn key(&self) -> String {
        normalize_text(&self.text)
    }
}

/// Identifier for a segment starting at `start_time` seconds
pub fn segment_id(start_time: f64) -> String {
    // Ties round towards positive infinity
    let millis = (start_time * 1000.0 + 0.5).floor() as i64;
    format!("segment-{}", millis)
}

/// Trim, collapse internal whitespace and lowercase
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Earliest start time observed for each normalized caption text
#[derive(Debug, Default, Clone)]
pub struct EarliestStartMemory {
    starts: HashMap<String, f64>,
}

impl EarliestStartMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation and return the earliest start known for the text
    pub fn remember(&mut self, text: &str, start_time: f64) -> f64 {
        let key = normalize_text(text);
        let earliest = match self.starts.get(&key) {
            Some(&known) if known <= start_time => known,
            _ => start_time,
        };
        if earliest.is_finite() {
            self.starts.insert(key, earliest);
        }
        trace!("Earliest start for '{}' is {:.3}s", text.trim(), earliest);
        earliest
    }

    /// Earliest start recorded for the text, if any
    pub fn lookup(&self, text: &str) -> Option<f64> {
        self.starts.get(&normalize_text(text)).copied()
    }

    /// Build a segment whose id/start reflect the earliest observation
    pub fn resolve(&mut self, text: &str, observed_start: f64) -> Segment {
        let start = self.remember(text, observed_start);
        Segment::new(text, start)
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn clear(&mut self) {
        self.starts.clear();
    }
}
