//! Reader — decode a line source into pooled character buffers.

use std::borrow::Cow;
use std::sync::atomic::Ordering;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::Sender;
use tracing::{debug, warn};

use crate::mask::Line;
use crate::state::SharedState;

/// Read the source line by line into pooled buffers.
///
/// `\n` and `\r\n` terminators are stripped. Invalid UTF-8 is replaced
/// with U+FFFD and logged; the line is still emitted so downstream stays
/// line-aligned. The lines queue closes when this task returns and drops
/// its sender.
pub async fn read_lines(state: SharedState, source: File, lines_tx: Sender<Line>) {
    let mut reader = BufReader::new(source);
    let mut raw: Vec<u8> = Vec::new();

    loop {
        raw.clear();
        match reader.read_until(b'\n', &mut raw).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "read failed, closing line stream");
                break;
            }
        }

        if raw.last() == Some(&b'\n') {
            raw.pop();
            if raw.last() == Some(&b'\r') {
                raw.pop();
            }
        }

        let decoded = String::from_utf8_lossy(&raw);
        if let Cow::Owned(_) = decoded {
            state.metrics.decode_errors.fetch_add(1, Ordering::Relaxed);
            warn!("invalid utf-8 on input line, bytes replaced");
        }

        let mut line = state.pool.acquire().await;
        line.extend(decoded.chars());
        state.metrics.lines_read.fetch_add(1, Ordering::Relaxed);

        if let Err(returned) = lines_tx.send(line).await {
            state.pool.release(returned.0);
            break;
        }
    }

    debug!(
        lines = state.metrics.lines_read.load(Ordering::Relaxed),
        "reader finished"
    );
}
