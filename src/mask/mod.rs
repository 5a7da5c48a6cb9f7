//! Mask module — masking engine and pipeline value types.

pub mod engine;
pub mod model;

pub use engine::{mask_line, Masked};
pub use model::{Context, ContextCandidate, LabelledTokens, Line, Sentence};

/// Placeholder for a top-level alphanumeric run.
pub const RUN_PLACEHOLDER: char = 'Y';

/// Placeholder for the content of a balanced enclosure.
pub const NESTED_PLACEHOLDER: char = 'X';

/// Closing character for an opening enclosure character.
/// Quotes close with the character that opened them.
pub(crate) fn closing_for(c: char) -> Option<char> {
    match c {
        '[' => Some(']'),
        '{' => Some('}'),
        '<' => Some('>'),
        '(' => Some(')'),
        '"' => Some('"'),
        '\'' => Some('\''),
        _ => None,
    }
}
