//! Run — open endpoints, wire the queues, spawn the stages, and
//! coordinate termination.
//!
//! The known queue has two writers, the dispatcher and the
//! contextualiser. Each holds its own sender and drops it only after its
//! upstream is drained; the contextualiser additionally waits for every
//! promotion task to join first. The queue therefore closes exactly when
//! both writers have signalled completion, and the labeller sees a
//! complete stream.

use tokio::fs::File;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::pipeline::{context, dispatch, label, masker, reader, sink};
use crate::state::SharedState;

/// File endpoints for one pipeline run.
pub struct RunPaths<'a> {
    pub input: &'a str,
    pub mask_out: &'a str,
    pub token_out: &'a str,
    pub report: Option<&'a str>,
}

/// Run the pipeline to completion over one input file.
pub async fn run(
    state: SharedState,
    paths: RunPaths<'_>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Every endpoint must open before any stage spawns; failures here
    // are fatal and the pipeline never starts.
    let input = File::open(paths.input)
        .await
        .map_err(|e| format!("could not open input {}: {e}", paths.input))?;
    let mask_sink_file = File::create(paths.mask_out)
        .await
        .map_err(|e| format!("could not open mask output {}: {e}", paths.mask_out))?;
    let token_sink_file = File::create(paths.token_out)
        .await
        .map_err(|e| format!("could not open token output {}: {e}", paths.token_out))?;

    let depth = state.config.queue_depth;
    let (lines_tx, lines_rx) = mpsc::channel(depth);
    let (sentences_tx, sentences_rx) = mpsc::channel(depth);
    let (masks_tx, masks_rx) = mpsc::channel(depth);
    let (unknown_tx, unknown_rx) = mpsc::channel(depth);
    let (known_tx, known_rx) = mpsc::channel(depth);
    let (labelled_tx, labelled_rx) = mpsc::channel(depth);

    let stages = [
        tokio::spawn(reader::read_lines(state.clone(), input, lines_tx)),
        tokio::spawn(masker::mask_stream(
            state.clone(),
            lines_rx,
            sentences_tx,
            masks_tx,
        )),
        tokio::spawn(dispatch::dispatch(
            state.clone(),
            sentences_rx,
            unknown_tx,
            known_tx.clone(),
        )),
        tokio::spawn(context::contextualise(state.clone(), unknown_rx, known_tx)),
        tokio::spawn(label::label_stream(state.clone(), known_rx, labelled_tx)),
        tokio::spawn(sink::write_masks(mask_sink_file, masks_rx)),
        tokio::spawn(sink::write_tokens(token_sink_file, labelled_rx)),
    ];

    for stage in stages {
        stage.await?;
    }

    // Masks the oracle never labelled still hold pooled buffers; return
    // them before checking the pool balance.
    for (mask, backlog) in state.samples.drain_all() {
        warn!(mask = %mask, count = backlog.len(), "mask never promoted, dropping buffered lines");
        for sentence in backlog {
            state
                .metrics
                .unlabelled_dropped
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            state.pool.release(sentence.line);
        }
    }

    if !state.pool.balanced() {
        let stats = state.pool.stats();
        warn!(
            acquired = stats.acquired,
            released = stats.released,
            "pool counters unbalanced at shutdown"
        );
    }

    if let Some(report) = paths.report {
        sink::write_report(report, &state).await?;
        info!(path = report, "diagnostics report written");
    }

    let snap = state.metrics.snapshot();
    info!(
        lines = snap.lines_read,
        labelled = snap.labelled,
        masks = state.registry.len(),
        "pipeline complete"
    );
    Ok(())
}
