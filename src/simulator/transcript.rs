/*!
 * SRT transcripts fed to the simulated caption renderer.
 */

use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{anyhow, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TranscriptError;

// @const: SRT timestamp regex
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{2}):(\d{2}):(\d{2}),(\d{3}) --> (\d{2}):(\d{2}):(\d{2}),(\d{3})").unwrap()
});

// @const: Inline formatting tags such as <i> or {\an8}
static TAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>|\{\\[^}]*\}").unwrap());

// @struct: One timed caption line
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Caption text, lines joined with a space
    pub text: String,
}

impl Cue {
    // @creates: Validated cue
    // @validates: Time range and non-empty text
    pub fn new_validated(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: &str) -> Result<Self> {
        if end_time_ms <= start_time_ms {
            return Err(anyhow!(
                "Invalid time range: end time {} <= start time {}",
                end_time_ms, start_time_ms
            ));
        }

        let clean = TAG_REGEX.replace_all(text, "");
        let clean = clean.split_whitespace().collect::<Vec<_>>().join(" ");
        if clean.is_empty() {
            return Err(anyhow!("Empty caption text for cue {}", seq_num));
        }

        Ok(Cue {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: clean,
        })
    }

    pub fn start_secs(&self) -> f64 {
        self.start_time_ms as f64 / 1000.0
    }

    pub fn end_secs(&self) -> f64 {
        self.end_time_ms as f64 / 1000.0
    }

    pub fn contains(&self, seconds: f64) -> bool {
        seconds >= self.start_secs() && seconds < self.end_secs()
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "[{} --> {}] {}",
            Self::format_timestamp(self.start_time_ms),
            Self::format_timestamp(self.end_time_ms),
            self.text
        )
    }
}

/// Cues of a transcript in start-time order
#[derive(Debug, Clone)]
pub struct Transcript {
    cues: Vec<Cue>,
}

impl Transcript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TranscriptError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse SRT content, skipping malformed entries
    pub fn parse(content: &str) -> Result<Self, TranscriptError> {
        let mut cues = Vec::new();

        let mut current_seq_num: Option<usize> = None;
        let mut current_times: Option<(u64, u64)> = None;
        let mut current_text = String::new();

        let mut add_current_cue = |seq_num: usize, (start_ms, end_ms): (u64, u64), text: &str| {
            match Cue::new_validated(seq_num, start_ms, end_ms, text) {
                Ok(cue) => cues.push(cue),
                Err(e) => warn!("Skipping invalid cue {}: {}", seq_num, e),
            }
        };

        for (line_index, line) in content.lines().enumerate() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if let (Some(seq_num), Some(times)) = (current_seq_num, current_times) {
                    if !current_text.is_empty() {
                        add_current_cue(seq_num, times, &current_text);
                        current_seq_num = None;
                        current_times = None;
                        current_text.clear();
                    }
                }
                continue;
            }

            if current_seq_num.is_none() && current_text.is_empty() {
                if let Ok(num) = trimmed.trim_start_matches('\u{feff}').parse::<usize>() {
                    current_seq_num = Some(num);
                    continue;
                }
            }

            if current_seq_num.is_some() && current_times.is_none() {
                if let Some(caps) = TIMESTAMP_REGEX.captures(trimmed) {
                    current_times = Some((timestamp_ms(&caps, 1), timestamp_ms(&caps, 5)));
                    continue;
                }
            }

            if current_times.is_some() {
                if !current_text.is_empty() {
                    current_text.push('\n');
                }
                current_text.push_str(trimmed);
            } else {
                warn!(
                    "Unexpected text at line {} before sequence number or timestamp: {}",
                    line_index + 1,
                    trimmed
                );
            }
        }

        if let (Some(seq_num), Some(times)) = (current_seq_num, current_times) {
            if !current_text.is_empty() {
                add_current_cue(seq_num, times, &current_text);
            }
        }

        if cues.is_empty() {
            return Err(TranscriptError::Empty);
        }

        cues.sort_by_key(|cue| cue.start_time_ms);
        for (i, cue) in cues.iter_mut().enumerate() {
            cue.seq_num = i + 1;
        }
        debug!("Parsed transcript with {} cues", cues.len());

        Ok(Self { cues })
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Cue on screen at `seconds`, with its position in the transcript.
    /// Overlapping cues resolve to the one that started last.
    pub fn cue_at(&self, seconds: f64) -> Option<(usize, &Cue)> {
        self.cues
            .iter()
            .enumerate()
            .rev()
            .find(|(_, cue)| cue.contains(seconds))
    }

    /// End of the last cue in seconds
    pub fn duration_secs(&self) -> f64 {
        self.cues.iter().map(Cue::end_secs).fold(0.0, f64::max)
    }
}

fn timestamp_ms(caps: &regex::Captures, start_idx: usize) -> u64 {
    let part = |offset: usize| -> u64 {
        caps.get(start_idx + offset)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    (part(0) * 3600 + part(1) * 60 + part(2)) * 1000 + part(3)
}
