/*!
 * Input state for a single gap.
 *
 * Mirrors what an input box next to a blank does: typing a value as long as
 * the expected word submits it, editing after a mistake clears the mistake,
 * and every wrong answer reveals a little more of the word.
 */

use crate::errors::ReplayError;
use crate::exercise::GapStatus;
use crate::host::HostPage;
use crate::session::ExerciseSession;
use crate::tokenizer::WordToken;

/// Highest hint level: the whole word is shown
pub const MAX_HINT_LEVEL: u8 = 2;

/// What an input change or submission led to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Nothing was validated
    Pending,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GapInput {
    segment_id: String,
    index: usize,
    word: String,
    value: String,
    hint_level: u8,
}

impl GapInput {
    pub fn new(segment_id: impl Into<String>, index: usize, word: impl Into<String>) -> Self {
        Self {
            segment_id: segment_id.into(),
            index,
            word: word.into(),
            value: String::new(),
            hint_level: 0,
        }
    }

    /// Input for a gap token; text tokens have none
    pub fn for_token(segment_id: &str, token: &WordToken) -> Option<Self> {
        match token {
            WordToken::Gap { value, index, .. } => Some(Self::new(segment_id, *index, value.clone())),
            WordToken::Text { .. } => None,
        }
    }

    pub fn segment_id(&self) -> &str {
        &self.segment_id
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn hint_level(&self) -> u8 {
        self.hint_level
    }

    /// Placeholder for the current hint level, `None` at level 0
    pub fn hint(&self) -> Option<String> {
        match self.hint_level {
            0 => None,
            1 => Some(masked_word(&self.word)),
            _ => Some(self.word.clone()),
        }
    }

    /// The value was edited
    pub fn on_change<H: HostPage>(
        &mut self,
        session: &mut ExerciseSession<H>,
        value: &str,
    ) -> Result<InputOutcome, ReplayError> {
        if session.gap_status(&self.segment_id, self.index) == GapStatus::Error {
            session.reset_gap_status(&self.segment_id, self.index);
        }
        self.value = value.to_string();

        if value.chars().count() == self.word.chars().count() {
            self.submit(session)
        } else {
            Ok(InputOutcome::Pending)
        }
    }

    /// Validate the current value (the Enter key)
    pub fn submit<H: HostPage>(
        &mut self,
        session: &mut ExerciseSession<H>,
    ) -> Result<InputOutcome, ReplayError> {
        let answer = self.value.trim().to_string();
        if answer.is_empty() {
            return Ok(InputOutcome::Pending);
        }

        if session.validate_gap(&self.segment_id, self.index, &answer, &self.word)? {
            self.hint_level = 0;
            Ok(InputOutcome::Correct)
        } else {
            self.hint_level = (self.hint_level + 1).min(MAX_HINT_LEVEL);
            self.value.clear();
            Ok(InputOutcome::Incorrect)
        }
    }

    /// Replace the value and submit it
    pub fn answer<H: HostPage>(
        &mut self,
        session: &mut ExerciseSession<H>,
        value: &str,
    ) -> Result<InputOutcome, ReplayError> {
        if session.gap_status(&self.segment_id, self.index) == GapStatus::Error {
            session.reset_gap_status(&self.segment_id, self.index);
        }
        self.value = value.to_string();
        self.submit(session)
    }
}

/// First and last letter with underscores between: `hello` -> `h___o`
pub fn masked_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    match chars.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [first, .., last] => {
            let hidden = chars.len().saturating_sub(2).max(1);
            format!("{}{}{}", first, "_".repeat(hidden), last)
        }
    }
}
