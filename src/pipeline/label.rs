//! Label — pair tokens with their inferred labels.

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use thiserror::Error;
use tokio::sync::mpsc::{Receiver, Sender};
use tracing::{debug, warn};

use crate::mask::{Context, LabelledTokens, Sentence};
use crate::registry::MaskEntry;
use crate::state::SharedState;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("token/label count mismatch: {tokens} tokens, {labels} labels")]
    CountMismatch { tokens: usize, labels: usize },
}

/// Pair each token with its positional label. A label may repeat within
/// one line, so grouped values are lists. Contexts whose label count
/// does not match the token count are rejected.
pub fn label_tokens(context: &Context, sentence: &Sentence) -> Result<LabelledTokens, LabelError> {
    if !context.compatible_with(sentence) {
        return Err(LabelError::CountMismatch {
            tokens: sentence.tokens.len(),
            labels: context.labels.len(),
        });
    }

    let mut groups: HashMap<String, Vec<String>> = HashMap::new();
    for (label, token) in context.labels.iter().zip(sentence.tokens.iter()) {
        groups.entry(label.clone()).or_default().push(token.clone());
    }

    Ok(LabelledTokens {
        mask: sentence.mask.clone(),
        groups,
        tokens: sentence.tokens.clone(),
    })
}

/// Consume the known queue and emit labelled tokens. Every sentence's
/// line buffer is returned to the pool here: the labeller is the
/// terminal consumer of raw lines. Per-sentence errors are logged and
/// skipped; only queue closure stops the stage.
pub async fn label_stream(
    state: SharedState,
    mut known_rx: Receiver<Sentence>,
    labelled_tx: Sender<LabelledTokens>,
) {
    while let Some(sentence) = known_rx.recv().await {
        let context = match state.registry.lookup(&sentence.mask) {
            Some(MaskEntry::Known(context)) => context,
            _ => {
                warn!(mask = %sentence.mask, "sentence on known queue without a context, skipping");
                state.pool.release(sentence.line);
                continue;
            }
        };

        let labelled = match label_tokens(&context, &sentence) {
            Ok(labelled) => labelled,
            Err(e) => {
                state.metrics.label_mismatches.fetch_add(1, Ordering::Relaxed);
                warn!(mask = %sentence.mask, error = %e, "skipping sentence");
                state.pool.release(sentence.line);
                continue;
            }
        };

        state.pool.release(sentence.line);
        state.metrics.labelled.fetch_add(1, Ordering::Relaxed);

        if labelled_tx.send(labelled).await.is_err() {
            break;
        }
    }

    debug!("labeller finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(text: &str) -> Sentence {
        let line: Vec<char> = text.chars().collect();
        let masked = crate::mask::mask_line(&line);
        Sentence {
            line,
            tokens: masked.tokens,
            mask: masked.mask,
        }
    }

    fn context(labels: &[&str]) -> Context {
        Context {
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    #[test]
    fn test_labels_pair_positionally() {
        let sentence = sentence("03-17 16:13");
        let context = context(&["month", "day", "hour", "minute"]);

        let labelled = label_tokens(&context, &sentence).expect("counts match");
        assert_eq!(labelled.tokens, vec!["03", "17", "16", "13"]);
        assert_eq!(labelled.groups["month"], vec!["03"]);
        assert_eq!(labelled.groups["minute"], vec!["13"]);
    }

    #[test]
    fn test_repeated_label_collects_in_order() {
        let sentence = sentence("1 2 3");
        let context = context(&["num", "num", "num"]);

        let labelled = label_tokens(&context, &sentence).expect("counts match");
        assert_eq!(labelled.groups.len(), 1);
        assert_eq!(labelled.groups["num"], vec!["1", "2", "3"]);
    }

    #[test]
    fn test_count_mismatch_rejected() {
        let sentence = sentence("a b c");
        let context = context(&["one", "two"]);

        assert_eq!(
            label_tokens(&context, &sentence),
            Err(LabelError::CountMismatch {
                tokens: 3,
                labels: 2
            })
        );
    }

    #[test]
    fn test_empty_sentence_with_empty_context() {
        let sentence = sentence("!!!");
        let context = context(&[]);

        let labelled = label_tokens(&context, &sentence).expect("zero matches zero");
        assert!(labelled.groups.is_empty());
        assert!(labelled.tokens.is_empty());
    }
}
