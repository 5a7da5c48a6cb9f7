//! Context — sample accumulation, oracle invocation, and replay.
//!
//! Sentences with an unpromoted mask buffer here until enough samples
//! exist, then a promotion task asks the oracle for labels, publishes
//! the context, and replays the buffered backlog onto the known queue.
//! At most one promotion task runs per mask. A failed task leaves the
//! samples in place; a later arrival re-triggers it, and samples that
//! arrived while the failing attempt was in flight count as that arrival
//! (they already passed the spawn check and found a task running).

use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashSet;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, warn};

use crate::mask::{ContextCandidate, Sentence};
use crate::registry::Appended;
use crate::state::SharedState;

pub async fn contextualise(
    state: SharedState,
    mut unknown_rx: Receiver<Sentence>,
    known_tx: Sender<Sentence>,
) {
    let in_flight: Arc<DashSet<String>> = Arc::new(DashSet::new());
    let mut tasks: JoinSet<Option<String>> = JoinSet::new();

    while let Some(sentence) = unknown_rx.recv().await {
        // Reap finished promotion tasks so failed attempts whose samples
        // grew mid-flight get their retry scheduled.
        while let Some(finished) = tasks.try_join_next() {
            handle_finished(&state, finished, &known_tx, &in_flight, &mut tasks);
        }

        accumulate(&state, sentence, &known_tx, &in_flight, &mut tasks).await;
    }

    // Upstream closed. Wait for every promotion task (including retries
    // scheduled here) before dropping our known-queue sender: the
    // labeller must see the full replay.
    while let Some(finished) = tasks.join_next().await {
        handle_finished(&state, finished, &known_tx, &in_flight, &mut tasks);
    }

    debug!("contextualiser finished");
}

async fn accumulate(
    state: &SharedState,
    sentence: Sentence,
    known_tx: &Sender<Sentence>,
    in_flight: &Arc<DashSet<String>>,
    tasks: &mut JoinSet<Option<String>>,
) {
    let mask = sentence.mask.clone();

    match state.samples.append(&mask, sentence) {
        // The mask was promoted and drained after the dispatcher's
        // lookup; forward the straggler on the known path.
        Appended::AlreadyKnown(sentence) => {
            state.metrics.replayed.fetch_add(1, Ordering::Relaxed);
            if let Err(returned) = known_tx.send(sentence).await {
                state.pool.release(returned.0.line);
            }
        }
        Appended::Buffered { count, evicted } => {
            if let Some(old) = evicted {
                state.metrics.samples_evicted.fetch_add(1, Ordering::Relaxed);
                state.pool.release(old.line);
            }

            // The in-flight marker is the spawn guard: inserting an
            // already-tracked mask returns false, so only one promotion
            // task exists per mask at a time.
            if count >= state.config.sample_threshold && in_flight.insert(mask.clone()) {
                tasks.spawn(promote_mask(
                    state.clone(),
                    mask,
                    known_tx.clone(),
                    Arc::clone(in_flight),
                ));
            }
        }
    }
}

fn handle_finished(
    state: &SharedState,
    finished: Result<Option<String>, JoinError>,
    known_tx: &Sender<Sentence>,
    in_flight: &Arc<DashSet<String>>,
    tasks: &mut JoinSet<Option<String>>,
) {
    match finished {
        Ok(Some(retry_mask)) => {
            if state.samples.count(&retry_mask) >= state.config.sample_threshold
                && in_flight.insert(retry_mask.clone())
            {
                tasks.spawn(promote_mask(
                    state.clone(),
                    retry_mask,
                    known_tx.clone(),
                    Arc::clone(in_flight),
                ));
            }
        }
        Ok(None) => {}
        Err(e) => warn!(error = %e, "promotion task panicked"),
    }
}

/// One promotion attempt for one mask. Returns the mask when a failed
/// attempt should be retried because samples arrived during its flight.
async fn promote_mask(
    state: SharedState,
    mask: String,
    known_tx: Sender<Sentence>,
    in_flight: Arc<DashSet<String>>,
) -> Option<String> {
    let candidate = ContextCandidate {
        samples: state.samples.snapshot_lines(&mask),
        mask: mask.clone(),
    };

    state.metrics.oracle_calls.fetch_add(1, Ordering::Relaxed);
    match state.oracle.infer(&candidate).await {
        Ok(context) => {
            state.registry.promote(&mask, context);
            state.metrics.promotions.fetch_add(1, Ordering::Relaxed);

            // Drain seals the buffer, so samples appended between the
            // snapshot and this point are included and later arrivals
            // are forwarded directly by the accumulate loop.
            let backlog = state.samples.drain(&mask);
            debug!(mask = %mask, backlog = backlog.len(), "mask promoted, replaying");

            for sentence in backlog {
                state.metrics.replayed.fetch_add(1, Ordering::Relaxed);
                if let Err(returned) = known_tx.send(sentence).await {
                    state.pool.release(returned.0.line);
                }
            }

            in_flight.remove(&mask);
            None
        }
        Err(e) => {
            // Clear the marker before the failure becomes observable so
            // the next arrival can re-trigger without finding a ghost
            // task still registered.
            in_flight.remove(&mask);
            state.metrics.oracle_failures.fetch_add(1, Ordering::Relaxed);
            warn!(mask = %mask, error = %e, "oracle inference failed, samples kept for retry");

            let grew = state.samples.count(&mask) > candidate.samples.len();
            grew.then_some(mask)
        }
    }
}
