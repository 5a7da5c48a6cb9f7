//! Masker — turn raw lines into sentences.

use std::sync::atomic::Ordering;

use tokio::sync::mpsc::{Receiver, Sender};
use tracing::debug;

use crate::mask::{mask_line, Line, Sentence};
use crate::state::SharedState;

/// Consume the lines queue, mask each line, and fan out: the sentence to
/// the dispatcher, the mask (one per input line) to the mask sink.
pub async fn mask_stream(
    state: SharedState,
    mut lines_rx: Receiver<Line>,
    sentences_tx: Sender<Sentence>,
    masks_tx: Sender<String>,
) {
    while let Some(line) = lines_rx.recv().await {
        let masked = mask_line(&line);
        state.metrics.sentences_masked.fetch_add(1, Ordering::Relaxed);

        // A closed mask sink must not stall the labelling path.
        let _ = masks_tx.send(masked.mask.clone()).await;

        let sentence = Sentence {
            line,
            tokens: masked.tokens,
            mask: masked.mask,
        };
        if let Err(returned) = sentences_tx.send(sentence).await {
            state.pool.release(returned.0.line);
            break;
        }
    }

    debug!("masker finished");
}
