/*!
 * Per-gap validation status.
 */

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

/// Validation state of one gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GapStatus {
    /// Not validated yet, or edited after a mistake
    #[default]
    Default,
    /// Matched; never changes afterwards
    Correct,
    /// Last validation did not match
    Error,
}

impl fmt::Display for GapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Default => "default",
            Self::Correct => "correct",
            Self::Error => "error",
        };
        write!(f, "{}", name)
    }
}

/// Gap statuses grouped by segment id
#[derive(Debug, Default, Clone)]
pub struct GapBook {
    statuses: HashMap<String, BTreeMap<usize, GapStatus>>,
}

impl GapBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of a gap, `Default` when never touched
    pub fn status(&self, segment_id: &str, index: usize) -> GapStatus {
        self.statuses
            .get(segment_id)
            .and_then(|gaps| gaps.get(&index))
            .copied()
            .unwrap_or_default()
    }

    /// Record a validation result and return the resulting status
    pub fn record(&mut self, segment_id: &str, index: usize, matched: bool) -> GapStatus {
        let slot = self.slot(segment_id, index);
        if *slot != GapStatus::Correct {
            *slot = if matched { GapStatus::Correct } else { GapStatus::Error };
        }
        *slot
    }

    /// Put an erroneous gap back to `Default`
    pub fn reset(&mut self, segment_id: &str, index: usize) -> GapStatus {
        let slot = self.slot(segment_id, index);
        if *slot == GapStatus::Error {
            *slot = GapStatus::Default;
        }
        *slot
    }

    /// Whether every listed gap of the segment is `Correct`. An empty list
    /// is never complete.
    pub fn all_correct<I>(&self, segment_id: &str, indices: I) -> bool
    where
        I: IntoIterator<Item = usize>,
    {
        let mut any = false;
        for index in indices {
            any = true;
            if self.status(segment_id, index) != GapStatus::Correct {
                return false;
            }
        }
        any
    }

    /// Statuses recorded for one segment, in gap order
    pub fn segment(&self, segment_id: &str) -> BTreeMap<usize, GapStatus> {
        self.statuses.get(segment_id).cloned().unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.statuses.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }

    fn slot(&mut self, segment_id: &str, index: usize) -> &mut GapStatus {
        self.statuses
            .entry(segment_id.to_string())
            .or_default()
            .entry(index)
            .or_default()
    }
}
