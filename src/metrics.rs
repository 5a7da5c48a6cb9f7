//! Metrics — atomic counters for every pipeline stage.
//!
//! Stages update their counters directly on the hot path; `snapshot`
//! gives a consistent-enough view for logging and the shutdown report.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

#[derive(Debug, Default)]
pub struct PipelineMetrics {
    pub lines_read: AtomicU64,
    pub decode_errors: AtomicU64,
    pub sentences_masked: AtomicU64,
    pub dispatched_known: AtomicU64,
    pub dispatched_unknown: AtomicU64,
    pub samples_evicted: AtomicU64,
    pub oracle_calls: AtomicU64,
    pub oracle_failures: AtomicU64,
    pub promotions: AtomicU64,
    pub replayed: AtomicU64,
    pub labelled: AtomicU64,
    pub label_mismatches: AtomicU64,
    pub unlabelled_dropped: AtomicU64,
}

/// Point-in-time copy of all counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub lines_read: u64,
    pub decode_errors: u64,
    pub sentences_masked: u64,
    pub dispatched_known: u64,
    pub dispatched_unknown: u64,
    pub samples_evicted: u64,
    pub oracle_calls: u64,
    pub oracle_failures: u64,
    pub promotions: u64,
    pub replayed: u64,
    pub labelled: u64,
    pub label_mismatches: u64,
    pub unlabelled_dropped: u64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            decode_errors: self.decode_errors.load(Ordering::Relaxed),
            sentences_masked: self.sentences_masked.load(Ordering::Relaxed),
            dispatched_known: self.dispatched_known.load(Ordering::Relaxed),
            dispatched_unknown: self.dispatched_unknown.load(Ordering::Relaxed),
            samples_evicted: self.samples_evicted.load(Ordering::Relaxed),
            oracle_calls: self.oracle_calls.load(Ordering::Relaxed),
            oracle_failures: self.oracle_failures.load(Ordering::Relaxed),
            promotions: self.promotions.load(Ordering::Relaxed),
            replayed: self.replayed.load(Ordering::Relaxed),
            labelled: self.labelled.load(Ordering::Relaxed),
            label_mismatches: self.label_mismatches.load(Ordering::Relaxed),
            unlabelled_dropped: self.unlabelled_dropped.load(Ordering::Relaxed),
        }
    }
}
