//! Model — value types flowing between pipeline stages.

use std::collections::HashMap;

use serde::Serialize;

/// One raw input line, decoded to Unicode scalar values.
/// Backed by a buffer borrowed from the line pool.
pub type Line = Vec<char>;

/// One line plus everything the masker derived from it.
///
/// Tokens are verbatim copies in left-to-right start-offset order,
/// including enclosure bodies captured as a single token each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentence {
    pub line: Line,
    pub tokens: Vec<String>,
    pub mask: String,
}

impl Sentence {
    /// Render the line back to a `String` (oracle samples, diagnostics).
    pub fn line_string(&self) -> String {
        self.line.iter().collect()
    }
}

/// Ordered field labels the oracle inferred for one mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    pub labels: Vec<String>,
}

impl Context {
    /// A context applies to a sentence only when the counts line up.
    pub fn compatible_with(&self, sentence: &Sentence) -> bool {
        self.labels.len() == sentence.tokens.len()
    }
}

/// Oracle input: a mask plus sample lines that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextCandidate {
    pub mask: String,
    pub samples: Vec<String>,
}

/// Tokens of one sentence grouped under their inferred labels.
///
/// A label may repeat within a line, so `groups` maps to token lists.
/// `tokens` keeps the original left-to-right order for serialisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledTokens {
    pub mask: String,
    pub groups: HashMap<String, Vec<String>>,
    pub tokens: Vec<String>,
}
