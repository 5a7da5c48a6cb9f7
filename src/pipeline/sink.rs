//! Sink — mask and token serialisation endpoints.
//!
//! Both sinks drain their queue to the end even after a write error, so
//! upstream stages never stall on a broken output file.

use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc::Receiver;
use tracing::{debug, error};

use crate::mask::LabelledTokens;
use crate::state::SharedState;

/// Write one mask per line, `\n`-terminated.
pub async fn write_masks(sink: File, mut masks_rx: Receiver<String>) {
    let mut writer = BufWriter::new(sink);
    let mut failed = false;

    while let Some(mask) = masks_rx.recv().await {
        if failed {
            continue;
        }
        if let Err(e) = write_record(&mut writer, &mask).await {
            error!(error = %e, "mask sink write failed, draining without output");
            failed = true;
        }
    }

    if let Err(e) = writer.flush().await {
        error!(error = %e, "mask sink flush failed");
    }
    debug!("mask sink finished");
}

/// Write one record per labelled sentence: tokens comma-joined in
/// left-to-right order, `\n`-terminated.
pub async fn write_tokens(sink: File, mut labelled_rx: Receiver<LabelledTokens>) {
    let mut writer = BufWriter::new(sink);
    let mut failed = false;

    while let Some(record) = labelled_rx.recv().await {
        if failed {
            continue;
        }
        if let Err(e) = write_record(&mut writer, &record.tokens.join(",")).await {
            error!(error = %e, "token sink write failed, draining without output");
            failed = true;
        }
    }

    if let Err(e) = writer.flush().await {
        error!(error = %e, "token sink flush failed");
    }
    debug!("token sink finished");
}

async fn write_record(writer: &mut BufWriter<File>, record: &str) -> std::io::Result<()> {
    writer.write_all(record.as_bytes()).await?;
    writer.write_all(b"\n").await
}

/// Write the shutdown diagnostics report: every recorded mask with its
/// registry state, then a counters snapshot.
pub async fn write_report(path: &str, state: &SharedState) -> std::io::Result<()> {
    let mut out = String::new();

    out.push_str("# masks\n");
    for (mask, known) in state.registry.masks() {
        let status = if known { "known" } else { "unknown" };
        out.push_str(&format!("{status}\t{mask}\n"));
    }

    let snap = state.metrics.snapshot();
    let pool = state.pool.stats();
    out.push_str("\n# counters\n");
    out.push_str(&format!("lines_read\t{}\n", snap.lines_read));
    out.push_str(&format!("decode_errors\t{}\n", snap.decode_errors));
    out.push_str(&format!("sentences_masked\t{}\n", snap.sentences_masked));
    out.push_str(&format!("dispatched_known\t{}\n", snap.dispatched_known));
    out.push_str(&format!("dispatched_unknown\t{}\n", snap.dispatched_unknown));
    out.push_str(&format!("samples_evicted\t{}\n", snap.samples_evicted));
    out.push_str(&format!("oracle_calls\t{}\n", snap.oracle_calls));
    out.push_str(&format!("oracle_failures\t{}\n", snap.oracle_failures));
    out.push_str(&format!("promotions\t{}\n", snap.promotions));
    out.push_str(&format!("replayed\t{}\n", snap.replayed));
    out.push_str(&format!("labelled\t{}\n", snap.labelled));
    out.push_str(&format!("label_mismatches\t{}\n", snap.label_mismatches));
    out.push_str(&format!("unlabelled_dropped\t{}\n", snap.unlabelled_dropped));
    out.push_str(&format!("pool_acquired\t{}\n", pool.acquired));
    out.push_str(&format!("pool_released\t{}\n", pool.released));

    tokio::fs::write(path, out).await
}
