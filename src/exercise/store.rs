/*!
 * The exercise store: the segment currently presented as an exercise, its
 * tokens and the gap statuses of every segment practised so far.
 */

use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::exercise::gaps::{GapBook, GapStatus};
use crate::segment::Segment;
use crate::tokenizer::{self, GapRule, WordToken};

/// Read model handed to UI layers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExerciseView {
    pub segment: Segment,
    pub tokens: Vec<WordToken>,
    pub statuses: BTreeMap<usize, GapStatus>,
}

impl ExerciseView {
    /// Gap words in index order
    pub fn gap_words(&self) -> Vec<(usize, &str)> {
        tokenizer::gap_words(&self.tokens)
    }

    pub fn status(&self, index: usize) -> GapStatus {
        self.statuses.get(&index).copied().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct ExerciseStore {
    rule: GapRule,
    segment: Option<Segment>,
    tokens: Vec<WordToken>,
    gaps: GapBook,
    last_paused: Option<String>,
}

impl ExerciseStore {
    pub fn new(rule: GapRule) -> Self {
        Self {
            rule,
            ..Self::default()
        }
    }

    pub fn rule(&self) -> &GapRule {
        &self.rule
    }

    /// Tokens for a segment under this store's gap rule
    pub fn tokenize(&self, segment: &Segment) -> Vec<WordToken> {
        tokenizer::tokenize_with(&segment.text, &segment.id, &self.rule)
    }

    /// Replace the exercise segment and its tokens
    pub fn publish(&mut self, segment: Segment, tokens: Vec<WordToken>) {
        debug!(
            "Publishing exercise {} with {} gap(s)",
            segment.id,
            tokenizer::gap_count(&tokens)
        );
        self.segment = Some(segment);
        self.tokens = tokens;
    }

    /// Replace the exercise segment, tokenizing it first
    pub fn publish_segment(&mut self, segment: Segment) {
        let tokens = self.tokenize(&segment);
        self.publish(segment, tokens);
    }

    /// Drop the exercise segment and forget which segment paused the video
    pub fn clear_segment(&mut self) {
        self.segment = None;
        self.tokens.clear();
        self.last_paused = None;
    }

    pub fn segment(&self) -> Option<&Segment> {
        self.segment.as_ref()
    }

    pub fn segment_id(&self) -> Option<&str> {
        self.segment.as_ref().map(|segment| segment.id.as_str())
    }

    pub fn tokens(&self) -> &[WordToken] {
        &self.tokens
    }

    pub fn gaps(&self) -> &GapBook {
        &self.gaps
    }

    pub fn record_gap(&mut self, segment_id: &str, index: usize, matched: bool) -> GapStatus {
        self.gaps.record(segment_id, index, matched)
    }

    pub fn reset_gap(&mut self, segment_id: &str, index: usize) -> GapStatus {
        self.gaps.reset(segment_id, index)
    }

    pub fn clear_gaps(&mut self) {
        self.gaps.clear();
    }

    /// Whether the exercise segment has a gap with this index
    pub fn has_gap(&self, segment_id: &str, index: usize) -> bool {
        self.segment_id() == Some(segment_id)
            && self
                .tokens
                .iter()
                .any(|token| matches!(token, WordToken::Gap { index: i, .. } if *i == index))
    }

    /// The exercise segment has at least one gap and all of them are correct
    pub fn all_gaps_completed(&self) -> bool {
        let Some(segment_id) = self.segment_id() else {
            return false;
        };
        let indices = tokenizer::gap_words(&self.tokens)
            .into_iter()
            .map(|(index, _)| index);
        self.gaps.all_correct(segment_id, indices)
    }

    pub fn mark_paused(&mut self, segment_id: &str) {
        self.last_paused = Some(segment_id.to_string());
    }

    pub fn last_paused(&self) -> Option<&str> {
        self.last_paused.as_deref()
    }

    pub fn view(&self) -> Option<ExerciseView> {
        let segment = self.segment.clone()?;
        let statuses = self.gaps.segment(&segment.id);
        Some(ExerciseView {
            segment,
            tokens: self.tokens.clone(),
            statuses,
        })
    }
}
