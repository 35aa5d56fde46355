/*!
 * Segment text tokenization.
 *
 * Splits caption text into decorative text tokens and blankable gap tokens.
 * Concatenating every token value reproduces the source text exactly.
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// Maximal runs of Unicode letters and apostrophes
static WORD_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}']+").unwrap());

/// A classified fragment of a segment's text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WordToken {
    /// Shown as-is: punctuation, whitespace and words not picked as gaps
    Text { value: String, id: String },
    /// Blanked and validated against user input
    Gap { value: String, index: usize, id: String },
}

impl WordToken {
    pub fn value(&self) -> &str {
        match self {
            Self::Text { value, .. } | Self::Gap { value, .. } => value,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Text { id, .. } | Self::Gap { id, .. } => id,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self, Self::Gap { .. })
    }
}

/// Which word positions may become gaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WordParity {
    /// 2nd, 4th, 6th... word of the segment
    #[default]
    Odd,
    /// 1st, 3rd, 5th... word of the segment
    Even,
    /// Every word long enough
    Any,
}

impl WordParity {
    fn admits(self, position: usize) -> bool {
        match self {
            Self::Odd => position % 2 == 1,
            Self::Even => position % 2 == 0,
            Self::Any => true,
        }
    }
}

/// Gap eligibility heuristic
///
/// The default picks words longer than two characters at odd positions,
/// which keeps roughly every other word visible as context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapRule {
    /// Minimum word length (in characters) for a gap
    #[serde(default = "default_min_len")]
    pub min_len: usize,

    /// Word positions eligible for gaps
    #[serde(default)]
    pub parity: WordParity,
}

impl Default for GapRule {
    fn default() -> Self {
        Self {
            min_len: default_min_len(),
            parity: WordParity::default(),
        }
    }
}

fn default_min_len() -> usize {
    3
}

impl GapRule {
    fn is_gap(&self, word: &str, position: usize) -> bool {
        self.parity.admits(position) && word.chars().count() >= self.min_len
    }
}

/// Tokenize segment text with the default gap rule
pub fn tokenize(text: &str, segment_id: &str) -> Vec<WordToken> {
    tokenize_with(text, segment_id, &GapRule::default())
}

/// Tokenize segment text with an explicit gap rule
pub fn tokenize_with(text: &str, segment_id: &str, rule: &GapRule) -> Vec<WordToken> {
    let mut tokens = Vec::new();
    let mut word_count = 0usize;
    let mut gap_index = 0usize;
    let mut token_id = 0usize;
    let mut cursor = 0usize;

    let mut push_text = |tokens: &mut Vec<WordToken>, value: &str| {
        tokens.push(WordToken::Text {
            value: value.to_string(),
            id: format!("{}-text-{}", segment_id, token_id),
        });
        token_id += 1;
    };

    for word in WORD_REGEX.find_iter(text) {
        if word.start() > cursor {
            push_text(&mut tokens, &text[cursor..word.start()]);
        }
        cursor = word.end();

        let position = word_count;
        word_count += 1;

        if rule.is_gap(word.as_str(), position) {
            tokens.push(WordToken::Gap {
                value: word.as_str().to_string(),
                index: gap_index,
                // 1-based suffix, matches ids already rendered by the UI layer
                id: format!("{}-gap-{}", segment_id, gap_index + 1),
            });
            gap_index += 1;
        } else {
            push_text(&mut tokens, word.as_str());
        }
    }

    if cursor < text.len() {
        push_text(&mut tokens, &text[cursor..]);
    }

    tokens
}

/// Number of gap tokens
pub fn gap_count(tokens: &[WordToken]) -> usize {
    tokens.iter().filter(|t| t.is_gap()).count()
}

/// Gap words in index order
pub fn gap_words(tokens: &[WordToken]) -> Vec<(usize, &str)> {
    tokens
        .iter()
        .filter_map(|t| match t {
            WordToken::Gap { value, index, .. } => Some((*index, value.as_str())),
            WordToken::Text { .. } => None,
        })
        .collect()
}
