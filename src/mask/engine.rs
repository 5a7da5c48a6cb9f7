//! Engine — recursive mask/tokenise scan and Y-run compression.
//!
//! A line is scanned left to right. Alphanumeric runs (`a-z`, `A-Z`,
//! `0-9`) become `Y` placeholders and are captured verbatim as tokens.
//! When an enclosure pair balances, everything between the pair collapses
//! to a single `X` in the mask and the raw body is captured as one token.
//! Unbalanced enclosures stay literal: the opening character remains in
//! the mask and nested runs tokenise normally. Compression then collapses
//! every maximal `Y` run to a single `Y`, so two lines that differ only
//! in alphanumeric content share a byte-identical mask.

use super::{closing_for, NESTED_PLACEHOLDER, RUN_PLACEHOLDER};

/// Result of one (possibly nested) scan pass.
#[derive(Debug)]
struct Scan {
    mask: String,
    consumed: usize,
    tokens: Vec<String>,
}

/// Masked output for one full line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Masked {
    pub mask: String,
    pub tokens: Vec<String>,
}

/// Mask a full line: recursive scan from the top level (where no closing
/// sentinel can match) followed by Y-run compression.
pub fn mask_line(input: &[char]) -> Masked {
    let scanned = scan(input, None);
    Masked {
        mask: compress(&scanned.mask),
        tokens: scanned.tokens,
    }
}

/// One scan level. `closing` is the character that terminates this level;
/// the top level passes `None`.
///
/// On a match with `closing`, everything scanned at this level is
/// discarded and replaced by `[X, closing]`, with `consumed` pointing at
/// the closing character. The caller captures the enclosure body as a
/// single token; the inner tokens are dropped because the body token
/// already covers them.
fn scan(input: &[char], closing: Option<char>) -> Scan {
    let mut mask = String::with_capacity(input.len());
    let mut tokens = Vec::new();
    let mut run = 0usize;

    let mut i = 0usize;
    while i < input.len() {
        let c = input[i];

        if c.is_ascii_alphanumeric() {
            mask.push(RUN_PLACEHOLDER);
            run += 1;
        } else {
            mask.push(c);
            if run > 0 {
                tokens.push(input[i - run..i].iter().collect());
                run = 0;
            }
        }

        // Closing check before opening check: quotes close with the same
        // character that opened them.
        if Some(c) == closing {
            let mut nested = String::with_capacity(2);
            nested.push(NESTED_PLACEHOLDER);
            nested.push(c);
            return Scan {
                mask: nested,
                consumed: i,
                tokens,
            };
        }

        if let Some(close) = closing_for(c) {
            let inner = scan(&input[i + 1..], Some(close));
            mask.push_str(&inner.mask);
            tokens.push(input[i + 1..i + 1 + inner.consumed].iter().collect());
            i += inner.consumed + 1;
        }

        i += 1;
    }

    if run > 0 {
        tokens.push(input[input.len() - run..].iter().collect());
    }

    Scan {
        mask,
        consumed: input.len(),
        tokens,
    }
}

/// Collapse every maximal run of `Y` to its last character. Structural
/// characters pass through verbatim. Idempotent.
fn compress(mask: &str) -> String {
    let mut out = String::with_capacity(mask.len());
    let mut chars = mask.chars().peekable();
    while let Some(c) = chars.next() {
        if c == RUN_PLACEHOLDER && chars.peek() == Some(&RUN_PLACEHOLDER) {
            continue;
        }
        out.push(c);
    }
    out
}
