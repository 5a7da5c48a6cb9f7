//! Dispatch — route sentences by mask registry state.

use std::sync::atomic::Ordering;

use tokio::sync::mpsc::{Receiver, Sender};
use tracing::debug;

use crate::mask::Sentence;
use crate::registry::MaskEntry;
use crate::state::SharedState;

/// Route each sentence: first sightings and still-unknown masks go to
/// the contextualiser, promoted masks go straight to the labeller.
///
/// A sentence may still be routed unknown briefly after its mask was
/// promoted; the contextualiser forwards such stragglers on the known
/// path, so every sentence traverses the known queue exactly once.
/// Dropping `known_tx` on return is this stage's half of the known-queue
/// close barrier; the contextualiser holds the other half.
pub async fn dispatch(
    state: SharedState,
    mut sentences_rx: Receiver<Sentence>,
    unknown_tx: Sender<Sentence>,
    known_tx: Sender<Sentence>,
) {
    while let Some(sentence) = sentences_rx.recv().await {
        let known = matches!(
            state.registry.lookup(&sentence.mask),
            Some(MaskEntry::Known(_))
        );

        let sent = if known {
            state.metrics.dispatched_known.fetch_add(1, Ordering::Relaxed);
            known_tx.send(sentence).await
        } else {
            state.registry.record_unknown(&sentence.mask);
            state.metrics.dispatched_unknown.fetch_add(1, Ordering::Relaxed);
            unknown_tx.send(sentence).await
        };

        if let Err(returned) = sent {
            state.pool.release(returned.0.line);
            break;
        }
    }

    debug!("dispatcher finished");
}
